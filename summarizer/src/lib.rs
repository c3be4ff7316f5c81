//! Clinical and veterinary summary service.
//!
//! Visit histories are shape-checked, validated, normalized to canonical
//! field names and handed to a pluggable summary backend. Both domains share
//! one pipeline parameterized by a [`domain::Domain`] descriptor.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod pipeline;
pub mod providers;
