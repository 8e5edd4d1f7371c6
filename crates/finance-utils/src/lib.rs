//! Shared utilities for finance-agent
//!
//! This crate provides common functionality used across the workspace:
//! tracing setup and environment loading.

pub mod config;
pub mod logging;

pub use config::{env_var, load_env};
pub use logging::{DEFAULT_FILTER, init_tracing, init_tracing_with};
