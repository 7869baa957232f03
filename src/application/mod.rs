//! # Application Layer
//!
//! Orchestration over the domain and infrastructure: the
//! [`ComparisonEngine`] merges provider catalogs, populates per-provider
//! offers under a bounded fan-out gate and caches the finished aggregates.

pub mod engine;

pub use engine::{ComparisonEngine, EngineConfig};
