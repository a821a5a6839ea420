/*
 * Copyright 2025 Filigree contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Bit-depth requantizer
//!
//! The telescope backend carries 2-bit samples in bit lanes 5:4 of each
//! raw byte. [`unpack_group`] gathers the four sample lanes of a 4-byte
//! group into one intermediate packed byte and scatters them back out as
//! four plain bytes holding values 0..=3 (with the group's byte order
//! reversed by the lane assignment); [`pack_group`] is its exact inverse.
//! The bit-lane reassignment is a wire contract with the acquisition
//! system and must be reproduced exactly, quirks included.
//!
//! Purely combinational; block sizes are guaranteed to be a multiple of 4
//! so there is no partial-group handling.

/// Requantize one 4-byte group from lane-coded samples to byte-per-sample.
///
/// After the call every byte holds a value in 0..=3.
pub fn unpack_group(group: &mut [u8; 4]) {
    let temp = ((group[0] << 2) & 0xc0) >> 6 & 0x03
        | ((group[1] << 2) & 0xc0) >> 4 & 0x0c
        | ((group[2] << 2) & 0xc0) >> 2 & 0x30
        | ((group[3] << 2) & 0xc0);

    group[3] = temp & 0x03;
    group[2] = (temp & 0x0c) >> 2;
    group[1] = (temp & 0x30) >> 4;
    group[0] = (temp & 0xc0) >> 6;
}

/// Inverse of [`unpack_group`]: return four byte-per-sample values to
/// their lane-coded positions.
pub fn pack_group(group: &mut [u8; 4]) {
    let temp = (group[3] & 0x03)
        | (group[2] & 0x03) << 2
        | (group[1] & 0x03) << 4
        | (group[0] & 0x03) << 6;

    group[0] = (temp & 0x03) << 4;
    group[1] = ((temp & 0x0c) >> 2) << 4;
    group[2] = ((temp & 0x30) >> 4) << 4;
    group[3] = ((temp & 0xc0) >> 6) << 4;
}

/// Requantize an entire block in 4-byte strides.
///
/// `block.len()` must be a multiple of 4.
pub fn unpack_block(block: &mut [u8]) {
    debug_assert_eq!(block.len() % 4, 0);
    for group in block.chunks_exact_mut(4) {
        // chunks_exact_mut guarantees the slice converts.
        if let Ok(array) = <&mut [u8; 4]>::try_from(group) {
            unpack_group(array);
        }
    }
}

/// Inverse of [`unpack_block`].
pub fn pack_block(block: &mut [u8]) {
    debug_assert_eq!(block.len() % 4, 0);
    for group in block.chunks_exact_mut(4) {
        if let Ok(array) = <&mut [u8; 4]>::try_from(group) {
            pack_group(array);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpack_output_is_always_a_level() {
        // Whatever the input byte, the requantized sample is 0..=3.
        for b0 in 0..=255u8 {
            let mut group = [b0, b0.wrapping_add(17), b0.wrapping_mul(3), !b0];
            unpack_group(&mut group);
            for sample in group {
                assert!(sample <= 3, "sample {} out of range", sample);
            }
        }
    }

    #[test]
    fn test_unpack_reverses_group_order() {
        // Samples sit in bits 5:4; the lane assignment reverses the group.
        let mut group = [0x00, 0x10, 0x20, 0x30];
        unpack_group(&mut group);
        assert_eq!(group, [3, 2, 1, 0]);
    }

    #[test]
    fn test_round_trip_all_sample_groups() {
        // pack then unpack is the identity for every 4-sample group: the
        // requantizer applied twice hands back the original samples.
        for value in 0..256u32 {
            let mut group = [
                (value & 0x03) as u8,
                ((value >> 2) & 0x03) as u8,
                ((value >> 4) & 0x03) as u8,
                ((value >> 6) & 0x03) as u8,
            ];
            let original = group;
            pack_group(&mut group);
            unpack_group(&mut group);
            assert_eq!(group, original, "round trip failed for {:?}", original);
        }
    }

    #[test]
    fn test_round_trip_lane_domain() {
        // unpack then pack restores any byte whose sample lanes carry the
        // data (bits 5:4), which is all the producer ever writes.
        for value in 0..256u32 {
            let mut group = [
                ((value & 0x03) << 4) as u8,
                (((value >> 2) & 0x03) << 4) as u8,
                (((value >> 4) & 0x03) << 4) as u8,
                (((value >> 6) & 0x03) << 4) as u8,
            ];
            let original = group;
            unpack_group(&mut group);
            pack_group(&mut group);
            assert_eq!(group, original);
        }
    }

    #[test]
    fn test_block_stride() {
        let mut block = vec![0u8; 16];
        for (i, byte) in block.iter_mut().enumerate() {
            *byte = ((i as u8) & 0x03) << 4;
        }
        let mut expected = Vec::new();
        for chunk in block.chunks_exact(4) {
            // Group order reverses within each stride.
            expected.extend(chunk.iter().rev().map(|b| b >> 4));
        }
        unpack_block(&mut block);
        assert_eq!(block, expected);
    }

    #[test]
    fn test_zero_block_stays_zero() {
        let mut block = vec![0u8; 64];
        unpack_block(&mut block);
        assert!(block.iter().all(|&b| b == 0));
        pack_block(&mut block);
        assert!(block.iter().all(|&b| b == 0));
    }
}
