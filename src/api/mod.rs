//! # API Layer
//!
//! Outward-facing surfaces. Currently one REST API over axum.

pub mod rest;
