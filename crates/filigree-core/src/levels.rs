/*
 * Copyright 2025 Filigree contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Quantization math primitives
//!
//! Pure numeric helpers used by the injection engine to decide how an
//! input discrete level maps to an output discrete level once a signal is
//! added on top of the receiver noise.

use std::f64::consts::SQRT_2;

/// Standard normal cumulative distribution function.
///
/// `gaussian_cdf(x) = 0.5 + 0.5 * erf(x / sqrt(2))`, defined over the
/// whole real line including the infinities.
pub fn gaussian_cdf(x: f64) -> f64 {
    0.5 + 0.5 * libm::erf(x / SQRT_2)
}

/// Smaller of two values.
pub fn min(a: f64, b: f64) -> f64 {
    if a < b {
        a
    } else {
        b
    }
}

/// Larger of two values.
pub fn max(a: f64, b: f64) -> f64 {
    if a > b {
        a
    } else {
        b
    }
}

/// Clip `x` to `[lo, hi)` with an exclusive upper bound.
///
/// Values below `lo` return `lo`; values at or above `hi` return `hi`
/// itself. The at-or-above convention classifies boundary samples at the
/// top of the discrete range, so it must not be "fixed" to `hi - 1`.
pub fn clip(x: i64, lo: i64, hi: i64) -> i64 {
    if x < lo {
        lo
    } else if x >= hi {
        hi
    } else {
        x
    }
}

/// Noise-domain interval `[lo, hi)` occupied by a quantization level.
///
/// For a quantizer with `levels` output levels and step `lvl` (in sigma
/// units), level `n` covers `[(n - levels/2) * lvl, (n + 1 - levels/2) * lvl)`,
/// with the bottom and top levels absorbing everything below and above.
pub fn level_bounds(level: i64, levels: i64, lvl: f64) -> (f64, f64) {
    let half = levels / 2;
    let lo = if level <= 0 {
        f64::NEG_INFINITY
    } else {
        (level - half) as f64 * lvl
    };
    let hi = if level >= levels - 1 {
        f64::INFINITY
    } else {
        (level + 1 - half) as f64 * lvl
    };
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cdf_midpoint_and_symmetry() {
        assert!((gaussian_cdf(0.0) - 0.5).abs() < 1e-15);
        for x in [0.1, 0.5, 1.0, 2.5, 5.0] {
            let sum = gaussian_cdf(x) + gaussian_cdf(-x);
            assert!((sum - 1.0).abs() < 1e-12, "cdf not symmetric at {}", x);
        }
    }

    #[test]
    fn test_cdf_known_value() {
        // cdf(1) for the standard normal.
        assert!((gaussian_cdf(1.0) - 0.841344746).abs() < 1e-8);
    }

    #[test]
    fn test_cdf_saturates_at_infinities() {
        assert_eq!(gaussian_cdf(f64::NEG_INFINITY), 0.0);
        assert_eq!(gaussian_cdf(f64::INFINITY), 1.0);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(min(1.0, 2.0), 1.0);
        assert_eq!(min(-3.0, -4.0), -4.0);
        assert_eq!(max(1.0, 2.0), 2.0);
        assert_eq!(max(-3.0, -4.0), -3.0);
    }

    #[test]
    fn test_clip_exclusive_upper() {
        assert_eq!(clip(-1, 0, 3), 0);
        assert_eq!(clip(0, 0, 3), 0);
        assert_eq!(clip(2, 0, 3), 2);
        // At-or-above the exclusive bound returns the bound itself.
        assert_eq!(clip(3, 0, 3), 3);
        assert_eq!(clip(7, 0, 3), 3);
    }

    #[test]
    fn test_level_bounds_two_bit() {
        let lvl = 1.0;
        assert_eq!(level_bounds(0, 4, lvl), (f64::NEG_INFINITY, -1.0));
        assert_eq!(level_bounds(1, 4, lvl), (-1.0, 0.0));
        assert_eq!(level_bounds(2, 4, lvl), (0.0, 1.0));
        assert_eq!(level_bounds(3, 4, lvl), (1.0, f64::INFINITY));
    }

    #[test]
    fn test_level_bounds_eight_bit() {
        let lvl = 0.03;
        let (lo, hi) = level_bounds(128, 256, lvl);
        assert!((lo - 0.0).abs() < 1e-15);
        assert!((hi - 0.03).abs() < 1e-15);
        let (lo, hi) = level_bounds(0, 256, lvl);
        assert_eq!(lo, f64::NEG_INFINITY);
        assert!((hi - -127.0 * lvl).abs() < 1e-12);
        let (lo, hi) = level_bounds(255, 256, lvl);
        assert!((lo - 127.0 * lvl).abs() < 1e-12);
        assert_eq!(hi, f64::INFINITY);
    }
}
