//! # Infrastructure Layer
//!
//! Adapters between the domain and the outside world: the shared byte
//! cache and the upstream provider integration.

pub mod cache;
pub mod providers;
