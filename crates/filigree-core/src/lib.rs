/*
 * Copyright 2025 Filigree contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Filigree Core
//!
//! Algorithmic heart of the injection stage:
//! - Gaussian CDF probability primitives and level helpers
//! - The 2-bit lane requantizer used by the telescope backend
//! - Sparse burst descriptors and their binary file format
//! - The quantization-aware probabilistic injection engine
//!
//! Everything here is single-threaded and allocation-light; the only I/O
//! is reading burst descriptor files at startup.

pub mod burst;
pub mod inject;
pub mod levels;
pub mod requant;
pub mod rng;

pub use burst::{BurstCell, BurstDescriptor, BurstFileError};
pub use inject::{inject_burst, BlockSpan, InjectionParams, InjectionReport};
pub use levels::{clip, gaussian_cdf, max, min};
pub use requant::{pack_block, pack_group, unpack_block, unpack_group};
pub use rng::{DeviateSource, ReplayDeviates, RunDeviates};

/// Sample bit depth handled by the injection engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    /// 4 quantization levels (0..=3).
    Two,
    /// 256 quantization levels (0..=255).
    Eight,
}

impl BitDepth {
    /// Highest legal quantization level for this depth.
    pub fn top_level(self) -> u8 {
        match self {
            BitDepth::Two => 3,
            BitDepth::Eight => 255,
        }
    }

    /// Number of quantization levels for this depth.
    pub fn levels(self) -> u32 {
        match self {
            BitDepth::Two => 4,
            BitDepth::Eight => 256,
        }
    }
}

impl TryFrom<u8> for BitDepth {
    type Error = u8;

    fn try_from(bits: u8) -> Result<Self, u8> {
        match bits {
            2 => Ok(BitDepth::Two),
            8 => Ok(BitDepth::Eight),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_depth_levels() {
        assert_eq!(BitDepth::Two.top_level(), 3);
        assert_eq!(BitDepth::Two.levels(), 4);
        assert_eq!(BitDepth::Eight.top_level(), 255);
        assert_eq!(BitDepth::Eight.levels(), 256);
    }

    #[test]
    fn test_bit_depth_from_config_value() {
        assert_eq!(BitDepth::try_from(2), Ok(BitDepth::Two));
        assert_eq!(BitDepth::try_from(8), Ok(BitDepth::Eight));
        assert_eq!(BitDepth::try_from(4), Err(4));
    }
}
