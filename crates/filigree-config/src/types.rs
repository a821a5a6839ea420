// Copyright 2025 Filigree contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `filigree_configuration.toml`, plus the derived [`RadiometerConfig`]
//! consumed by the injection engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct FiligreeConfig {
    pub system: SystemConfig,
    pub rings: RingsConfig,
    pub bursts: BurstsConfig,
    pub debug: DebugConfig,
}

/// Observing-system configuration (the `[system]` section)
///
/// Frequencies are in MHz, times in seconds, temperatures in K and the
/// gain in K/Jy, matching the units the backend control system publishes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Number of frequency channels.
    pub nf: usize,
    /// Observation start time, seconds.
    pub t1: f64,
    /// Observation end time, seconds.
    pub t2: f64,
    /// Lowest frequency of the band, MHz.
    pub f1: f64,
    /// Highest frequency of the band, MHz.
    pub f2: f64,
    /// Sampling time, seconds.
    pub dt: f64,
    /// System temperature, K.
    pub tsys: f64,
    /// System gain, K/Jy.
    pub gain: f64,
    /// Quantizer step size in units of the noise sigma.
    pub level_width: f64,
    /// Sample bit depth of the incoming stream (2 or 8).
    pub bit_depth: u8,
    /// Reverse channel order before indexing (spectrally flipped bands).
    pub flip_band: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            nf: 4096,
            t1: 0.0,
            t2: 0.0,
            f1: 300.0,
            f2: 500.0,
            dt: 1.31072e-3,
            tsys: 100.0,
            gain: 0.33,
            level_width: 1.0,
            bit_depth: 2,
            flip_band: false,
        }
    }
}

/// Ring-buffer geometry and segment identity (the `[rings]` section)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RingsConfig {
    /// Number of slots per ring.
    pub capacity_blocks: u32,
    /// Bytes of sample data per slot.
    pub block_size: usize,
    /// Producer's header segment (attached read-only).
    pub input_header: PathBuf,
    /// Producer's data segment (attached read-only).
    pub input_data: PathBuf,
    /// Output header segment (created if absent).
    pub output_header: PathBuf,
    /// Output data segment (created if absent).
    pub output_data: PathBuf,
    /// Poll interval while waiting for the producer, milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for RingsConfig {
    fn default() -> Self {
        Self {
            capacity_blocks: 16,
            block_size: 32 * 512 * 4096,
            // Default segment names carry the historical numeric keys so
            // one deployment name maps to one segment.
            input_header: PathBuf::from("/dev/shm/filigree-hdr-2031"),
            input_data: PathBuf::from("/dev/shm/filigree-buf-2032"),
            output_header: PathBuf::from("/dev/shm/filigree-hdr-5031"),
            output_data: PathBuf::from("/dev/shm/filigree-buf-5032"),
            poll_interval_ms: 2,
        }
    }
}

/// Burst descriptor inputs (the `[bursts]` section)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BurstsConfig {
    /// Descriptor files to weave in, in addition to any given on the CLI.
    pub files: Vec<PathBuf>,
}

/// Debugging aids (the `[debug]` section)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DebugConfig {
    /// File that receives a copy of every published block when the debug
    /// dump is enabled.
    pub dump_path: PathBuf,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            dump_path: PathBuf::from("temp.raw"),
        }
    }
}

/// Per-run radiometer parameters derived from [`SystemConfig`]
///
/// Immutable once computed; calibrates how a flux value is expressed in
/// quantization-level units.
#[derive(Debug, Clone)]
pub struct RadiometerConfig {
    pub nf: usize,
    pub f1: f64,
    pub f2: f64,
    /// Bandwidth, MHz.
    pub bw: f64,
    /// Channel width, MHz.
    pub df: f64,
    pub dt: f64,
    pub tsys: f64,
    pub gain: f64,
    pub level_width: f64,
}

impl RadiometerConfig {
    /// Expected per-sample noise standard deviation from the radiometer
    /// equation, in Jy: `tsys / gain / sqrt(2 * dt * channel_width_Hz)`.
    pub fn sigma(&self) -> f64 {
        let df_hz = self.df * 1e6;
        self.tsys / self.gain / (2.0 * self.dt * df_hz).sqrt()
    }
}

impl FiligreeConfig {
    /// Derive the immutable radiometer parameters for this run.
    pub fn radiometer(&self) -> RadiometerConfig {
        let bw = self.system.f2 - self.system.f1;
        let df = bw / self.system.nf as f64;
        RadiometerConfig {
            nf: self.system.nf,
            f1: self.system.f1,
            f2: self.system.f2,
            bw,
            df,
            dt: self.system.dt,
            tsys: self.system.tsys,
            gain: self.system.gain,
            level_width: self.system.level_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry_matches_backend() {
        let config = FiligreeConfig::default();
        assert_eq!(config.rings.capacity_blocks, 16);
        assert_eq!(config.rings.block_size, 67_108_864);
        assert_eq!(config.rings.block_size % 4, 0);
    }

    #[test]
    fn test_derived_radiometer_quantities() {
        let mut config = FiligreeConfig::default();
        config.system.nf = 4096;
        config.system.f1 = 300.0;
        config.system.f2 = 500.0;
        config.system.tsys = 100.0;
        config.system.gain = 0.5;
        config.system.dt = 1.31072e-3;

        let radiometer = config.radiometer();
        assert!((radiometer.bw - 200.0).abs() < 1e-12);
        assert!((radiometer.df - 200.0 / 4096.0).abs() < 1e-12);
        // 2 * dt * df_hz works out to exactly 128.0 for these values.
        let expected = 200.0 / 128.0_f64.sqrt();
        assert!((radiometer.sigma() - expected).abs() < 1e-9);
    }
}
