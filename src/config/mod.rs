//! Configuration module for xcom-downloader.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - CLI argument merging
//! - Configuration validation

pub mod loader;
pub mod validation;

pub use loader::{Config, OptionsConfig, SessionConfig};
pub use validation::validate_config;
