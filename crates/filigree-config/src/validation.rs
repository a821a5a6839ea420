// Copyright 2025 Filigree contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Ensures configuration values are consistent and within valid ranges
//! before any shared memory is touched.

use crate::{ConfigError, ConfigResult, FiligreeConfig};

/// Validate the complete configuration
///
/// Checks for:
/// - A positive channel count and a non-degenerate frequency band
/// - Positive sampling time, system temperature, gain and level width
/// - A supported bit depth (2 or 8)
/// - Ring geometry the bridge can operate on
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every failed check.
pub fn validate_config(config: &FiligreeConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    let system = &config.system;
    if system.nf == 0 {
        errors.push("system.nf must be positive".to_string());
    }
    if system.f2 <= system.f1 {
        errors.push(format!(
            "system.f2 ({}) must be above system.f1 ({})",
            system.f2, system.f1
        ));
    }
    if system.dt <= 0.0 {
        errors.push("system.dt must be positive".to_string());
    }
    if system.tsys <= 0.0 {
        errors.push("system.tsys must be positive".to_string());
    }
    if system.gain <= 0.0 {
        errors.push("system.gain must be positive".to_string());
    }
    if system.level_width <= 0.0 {
        errors.push("system.level_width must be positive".to_string());
    }
    if system.bit_depth != 2 && system.bit_depth != 8 {
        errors.push(format!(
            "system.bit_depth must be 2 or 8, got {}",
            system.bit_depth
        ));
    }

    let rings = &config.rings;
    if rings.capacity_blocks < 2 {
        errors.push(format!(
            "rings.capacity_blocks must be at least 2, got {}",
            rings.capacity_blocks
        ));
    }
    if rings.block_size == 0 || rings.block_size % 4 != 0 {
        errors.push(format!(
            "rings.block_size must be a positive multiple of 4, got {}",
            rings.block_size
        ));
    }
    if rings.poll_interval_ms == 0 {
        errors.push("rings.poll_interval_ms must be nonzero".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = FiligreeConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_rejects_zero_channels() {
        let mut config = FiligreeConfig::default();
        config.system.nf = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_inverted_band() {
        let mut config = FiligreeConfig::default();
        config.system.f1 = 750.0;
        config.system.f2 = 550.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_unsupported_bit_depth() {
        let mut config = FiligreeConfig::default();
        config.system.bit_depth = 4;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_unaligned_block_size() {
        let mut config = FiligreeConfig::default();
        config.rings.block_size = 1022;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = FiligreeConfig::default();
        config.system.nf = 0;
        config.system.gain = -1.0;
        config.rings.capacity_blocks = 1;
        let err = validate_config(&config).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("system.nf"));
        assert!(message.contains("system.gain"));
        assert!(message.contains("rings.capacity_blocks"));
    }
}
