// Copyright 2025 Filigree contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading
//!
//! Loads the TOML configuration from an explicit path, the
//! `FILIGREE_CONFIG_PATH` environment variable, or the working directory.

use crate::{validate_config, ConfigError, ConfigResult, FiligreeConfig};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name searched in the working directory.
pub const CONFIG_FILE_NAME: &str = "filigree_configuration.toml";

/// Find the filigree configuration file
///
/// Search order:
/// 1. `FILIGREE_CONFIG_PATH` environment variable
/// 2. Current working directory: `./filigree_configuration.toml`
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("FILIGREE_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by FILIGREE_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let cwd_path = env::current_dir()
        .map(|cwd| cwd.join(CONFIG_FILE_NAME))
        .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE_NAME));
    if cwd_path.exists() {
        return Ok(cwd_path);
    }

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in the working directory. Set FILIGREE_CONFIG_PATH or pass --config.",
        CONFIG_FILE_NAME
    )))
}

/// Load and validate configuration from a TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to the config file. If `None`, the file
///   is discovered via [`find_config_file`].
///
/// # Errors
///
/// Returns an error if the file is missing, contains invalid TOML, or
/// fails validation.
pub fn load_config(config_path: Option<&Path>) -> ConfigResult<FiligreeConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let config: FiligreeConfig = toml::from_str(&content)?;

    validate_config(&config)?;

    Ok(config)
}
