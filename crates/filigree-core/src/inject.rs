/*
 * Copyright 2025 Filigree contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Injection engine
//!
//! Adds a synthetic burst to one timestamp-addressed sample block while
//! keeping every sample a legal quantization level. The model: receiver
//! noise is a unit Gaussian, the quantizer bins it with step `lvl` (in
//! sigma units), and a burst adds a deterministic offset `signal` to the
//! underlying analog value. Conditioned on the recorded input level, the
//! probability of each output level is a ratio of Gaussian CDF
//! differences; one uniform deviate per affected sample picks the output
//! by scanning candidates from the largest shift downward, so larger
//! signals can only push samples toward higher levels and the top level
//! is absorbing.

use crate::burst::BurstDescriptor;
use crate::levels::{gaussian_cdf, level_bounds, max, min};
use crate::rng::DeviateSource;
use crate::BitDepth;
use tracing::{debug, warn};

/// Immutable per-run injection parameters.
#[derive(Debug, Clone)]
pub struct InjectionParams {
    /// Number of frequency channels per time bin.
    pub nf: usize,
    /// Sampling time, s.
    pub dt: f64,
    /// Per-sample noise standard deviation from the radiometer equation, Jy.
    pub sigma: f64,
    /// Quantizer step in sigma units.
    pub level_width: f64,
    /// Bit depth of the sample stream.
    pub bit_depth: BitDepth,
    /// Reverse channel order (spectrally flipped band).
    pub flip_band: bool,
}

/// Absolute sample-index range `[start, end)` covered by one block,
/// in the flattened `(time, channel)` index space.
#[derive(Debug, Clone, Copy)]
pub struct BlockSpan {
    pub start: u64,
    pub end: u64,
}

impl BlockSpan {
    /// Span of block number `block` for blocks of `block_size` samples.
    pub fn of_block(block: u32, block_size: usize) -> Self {
        let start = block as u64 * block_size as u64;
        Self {
            start,
            end: start + block_size as u64,
        }
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// What one burst did to one block.
#[derive(Debug, Clone, Copy, Default)]
pub struct InjectionReport {
    /// Cells whose sample fell inside the block and was re-drawn.
    pub cells_applied: usize,
    /// Cells skipped as before the block or past its end.
    pub cells_skipped: usize,
    /// Applied cells whose level actually changed.
    pub levels_shifted: usize,
}

/// Weave one burst into one block.
///
/// The block is mutated in place. Cells before the block are skipped;
/// the scan stops at the first cell past the block end (cells arrive in
/// non-decreasing time order). A descriptor with no cells is a logged
/// no-op, never an error.
pub fn inject_burst(
    block: &mut [u8],
    span: BlockSpan,
    burst: &BurstDescriptor,
    params: &InjectionParams,
    deviates: &mut dyn DeviateSource,
) -> InjectionReport {
    let mut report = InjectionReport::default();

    if burst.is_empty() {
        warn!("Burst at t0 = {:.3} s has no cells; skipping.", burst.t0);
        return report;
    }

    let start_bin = burst.start_bin(params.dt);
    let nf = params.nf as i64;

    for cell in &burst.cells {
        let time_bin = start_bin + cell.row as i64;
        let channel = if params.flip_band {
            nf - 1 - cell.col as i64
        } else {
            cell.col as i64
        };
        let index = time_bin * nf + channel;

        if index < span.start as i64 {
            report.cells_skipped += 1;
            continue;
        }
        if index as u64 >= span.end {
            report.cells_skipped += 1;
            // Rows are non-decreasing, but a flipped band walks channels
            // backwards within a row, so only stop once the whole row is
            // past the block.
            if time_bin * nf >= span.end as i64 {
                break;
            }
            continue;
        }

        let offset = (index as u64 % span.len()) as usize;
        let signal = cell.flux / params.sigma;
        let deviate = deviates.next_uniform();

        let input = block[offset];
        let output = match params.bit_depth {
            BitDepth::Two => shift_level_2bit(input, params.level_width, signal, deviate),
            BitDepth::Eight => shift_level_8bit(input, params.level_width, signal, deviate),
        };
        if output != input {
            report.levels_shifted += 1;
        }
        block[offset] = output;
        report.cells_applied += 1;
    }

    debug!(
        "Burst t0 = {:.3} s: {} cells applied, {} shifted, {} skipped.",
        burst.t0, report.cells_applied, report.levels_shifted, report.cells_skipped
    );

    report
}

/// Conditional mass of landing on `[out_lo, out_hi)` after adding
/// `signal`, given the noise started in `[in_lo, in_hi)`.
fn transition_mass(in_lo: f64, in_hi: f64, out_lo: f64, out_hi: f64, signal: f64) -> f64 {
    let hi = min(in_hi, out_hi - signal);
    let lo = max(in_lo, out_lo - signal);
    (gaussian_cdf(hi) - gaussian_cdf(lo)).max(0.0)
}

/// Output level for a 2-bit sample.
///
/// Closed-form four-case decision tree over the input level. The deviate
/// is compared against cumulative CDF-ratio thresholds taken from the
/// top shift downward, so for a fixed deviate a larger signal never
/// produces a smaller output level. Level 3 is absorbing.
pub fn shift_level_2bit(input: u8, lvl: f64, signal: f64, deviate: f64) -> u8 {
    match input {
        0 => {
            // Input interval (-inf, -lvl).
            let denom = gaussian_cdf(-lvl);
            if denom <= 0.0 {
                return 0;
            }
            let p3 = (gaussian_cdf(-lvl) - gaussian_cdf(lvl - signal)).max(0.0) / denom;
            if deviate < p3 {
                return 3;
            }
            let p2 = (gaussian_cdf(min(-lvl, lvl - signal)) - gaussian_cdf(-signal)).max(0.0)
                / denom;
            if deviate < p3 + p2 {
                return 2;
            }
            let p1 = (gaussian_cdf(min(-lvl, -signal)) - gaussian_cdf(-lvl - signal)).max(0.0)
                / denom;
            if deviate < p3 + p2 + p1 {
                return 1;
            }
            0
        }
        1 => {
            // Input interval [-lvl, 0).
            let denom = gaussian_cdf(0.0) - gaussian_cdf(-lvl);
            if denom <= 0.0 {
                return 1;
            }
            let p3 =
                (gaussian_cdf(0.0) - gaussian_cdf(max(-lvl, lvl - signal))).max(0.0) / denom;
            if deviate < p3 {
                return 3;
            }
            let p2 = (gaussian_cdf(min(0.0, lvl - signal)) - gaussian_cdf(max(-lvl, -signal)))
                .max(0.0)
                / denom;
            if deviate < p3 + p2 {
                return 2;
            }
            1
        }
        2 => {
            // Input interval [0, lvl).
            let denom = gaussian_cdf(lvl) - gaussian_cdf(0.0);
            if denom <= 0.0 {
                return 2;
            }
            let p3 = (gaussian_cdf(lvl) - gaussian_cdf(max(0.0, lvl - signal))).max(0.0) / denom;
            if deviate < p3 {
                return 3;
            }
            2
        }
        // Level 3 (and anything out of range) is absorbing.
        _ => 3,
    }
}

/// Output level for an 8-bit sample.
///
/// Scans candidate shifts `m` from `255 - input` down to zero and
/// accepts the first whose cumulative transition mass exceeds the
/// deviate; ties between equal-mass candidates therefore resolve to the
/// larger shift. Level 255 is absorbing.
pub fn shift_level_8bit(input: u8, lvl: f64, signal: f64, deviate: f64) -> u8 {
    if input == 255 {
        return 255;
    }

    let levels = i64::from(BitDepth::Eight.levels());
    let input_level = input as i64;
    let (in_lo, in_hi) = level_bounds(input_level, levels, lvl);
    let denom = gaussian_cdf(in_hi) - gaussian_cdf(in_lo);
    if denom <= 0.0 {
        return input;
    }

    let mut cumulative = 0.0;
    for shift in (0..=(255 - input_level)).rev() {
        let out_level = input_level + shift;
        let (out_lo, out_hi) = level_bounds(out_level, levels, lvl);
        cumulative += transition_mass(in_lo, in_hi, out_lo, out_hi, signal) / denom;
        if cumulative > deviate {
            return out_level as u8;
        }
    }

    input
}
