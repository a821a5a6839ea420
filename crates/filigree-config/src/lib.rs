// Copyright 2025 Filigree contributors
// SPDX-License-Identifier: Apache-2.0

//! # Filigree Configuration System
//!
//! Type-safe configuration loader for the injection stage:
//! - TOML file parsing (`filigree_configuration.toml`)
//! - Explicit path or `FILIGREE_CONFIG_PATH` discovery
//! - Validation of observing-system and ring-buffer parameters
//! - Derived radiometer quantities (bandwidth, channel width, noise sigma)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use filigree_config::load_config;
//!
//! let config = load_config(None).expect("Failed to load config");
//! println!("Channels: {}", config.system.nf);
//! println!("Noise sigma: {:.3} Jy", config.radiometer().sigma());
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{find_config_file, load_config};
pub use types::*;
pub use validation::validate_config;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Result alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
