/*
 * Copyright 2025 Filigree contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Binary layout of the ring-buffer segments
//!
//! The layouts mirror the acquisition system's C structs on x86-64,
//! including alignment padding. With capacity `C` and block size `B`:
//!
//! Header segment:
//! ```text
//! [0:4)            active     u32
//! [4:8)            status     u32
//! [8:16)           comptime   f64
//! [16:24)          datatime   f64
//! [24:32)          reftime    f64
//! [32:32+16C)      timestamp      C x { tv_sec: i64, tv_usec: i64 }
//! [..+16C)         timestamp_gps  C x { tv_sec: i64, tv_usec: i64 }
//! [..+8C)          blk_nano   C x f64
//! ```
//!
//! Data segment:
//! ```text
//! [0:4)            flag       u32
//! [4:8)            curr_blk   u32   blocks written so far
//! [8:12)           curr_rec   u32   slot the next block lands in
//! [12:16)          blk_size   u32
//! [16:20)          overflow   i32
//! [20:24)          (padding to 8-byte alignment)
//! [24:24+8C)       comptime   C x f64
//! [..+8C)          datatime   C x f64
//! [..+C*B)         data       C blocks of B bytes
//! ```
//!
//! All integers little-endian. `curr_blk` increases without bound;
//! `curr_rec == curr_blk mod C` always holds for a well-behaved writer.

/// Byte offset of the `active` flag in the header segment.
pub const HEADER_ACTIVE_OFFSET: usize = 0;

/// Byte offset of the `curr_blk` cursor in the data segment.
pub const DATA_CURR_BLK_OFFSET: usize = 4;

/// Byte offset of the `curr_rec` cursor in the data segment.
pub const DATA_CURR_REC_OFFSET: usize = 8;

/// Byte offset of the `blk_size` field in the data segment.
pub const DATA_BLK_SIZE_OFFSET: usize = 12;

/// Fixed bytes of the header segment before the per-block arrays.
const HEADER_FIXED: usize = 32;

/// Fixed bytes of the data segment before the per-block arrays,
/// including the 4 bytes of alignment padding after `overflow`.
const DATA_FIXED: usize = 24;

/// Parameterized ring-buffer geometry.
///
/// Constructed once at startup from configuration so the same code runs
/// against the production gigabyte ring and the tiny synthetic rings the
/// tests use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingGeometry {
    /// Number of slots in the ring.
    pub capacity_blocks: u32,
    /// Bytes of sample data per slot.
    pub block_size: usize,
}

impl RingGeometry {
    pub fn new(capacity_blocks: u32, block_size: usize) -> Self {
        Self {
            capacity_blocks,
            block_size,
        }
    }

    /// Total size of the header segment in bytes.
    pub fn header_len(&self) -> usize {
        HEADER_FIXED + 40 * self.capacity_blocks as usize
    }

    /// Total size of the data segment in bytes.
    pub fn data_len(&self) -> usize {
        self.data_start() + self.capacity_blocks as usize * self.block_size
    }

    /// Offset of the circular block array within the data segment.
    pub fn data_start(&self) -> usize {
        DATA_FIXED + 16 * self.capacity_blocks as usize
    }

    /// Slot index holding a given block number.
    pub fn record_of(&self, block: u32) -> u32 {
        block % self.capacity_blocks
    }

    /// Byte range of one slot within the data segment.
    pub fn block_range(&self, record: u32) -> std::ops::Range<usize> {
        let start = self.data_start() + record as usize * self.block_size;
        start..start + self.block_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_geometry_sizes() {
        // 16 slots of 64 MiB: the historical 1 GiB search-ring layout.
        let geometry = RingGeometry::new(16, 32 * 512 * 4096);
        assert_eq!(geometry.header_len(), 32 + 40 * 16);
        assert_eq!(geometry.data_start(), 24 + 16 * 16);
        assert_eq!(
            geometry.data_len(),
            24 + 16 * 16 + 16usize * 32 * 512 * 4096
        );
    }

    #[test]
    fn test_record_wraps() {
        let geometry = RingGeometry::new(16, 64);
        assert_eq!(geometry.record_of(0), 0);
        assert_eq!(geometry.record_of(15), 15);
        assert_eq!(geometry.record_of(16), 0);
        assert_eq!(geometry.record_of(37), 5);
    }

    #[test]
    fn test_block_ranges_tile_the_array() {
        let geometry = RingGeometry::new(4, 32);
        let mut expected_start = geometry.data_start();
        for record in 0..4 {
            let range = geometry.block_range(record);
            assert_eq!(range.start, expected_start);
            assert_eq!(range.len(), 32);
            expected_start = range.end;
        }
        assert_eq!(expected_start, geometry.data_len());
    }
}
