/*
 * Copyright 2025 Filigree contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Typed ring-buffer accessors
//!
//! [`RingReader`] holds a read-only view of a producer's ring;
//! [`RingWriter`] owns the output ring. Both go through [`RingGeometry`]
//! for every offset, so the layout contract stays in one place and the
//! tests can run against rings a few hundred bytes long.

use crate::layout::{
    RingGeometry, DATA_BLK_SIZE_OFFSET, DATA_CURR_BLK_OFFSET, DATA_CURR_REC_OFFSET,
    HEADER_ACTIVE_OFFSET,
};
use crate::segment;
use crate::ShmError;
use memmap2::{Mmap, MmapMut};
use std::path::Path;
use tracing::info;

/// A ring cursor snapshot: `block` is the unbounded sequence number,
/// `record` its slot (`block mod capacity` for a well-behaved writer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub block: u32,
    pub record: u32,
}

fn read_u32(mmap: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        mmap[offset],
        mmap[offset + 1],
        mmap[offset + 2],
        mmap[offset + 3],
    ])
}

/// Read-only view of a producer's ring.
pub struct RingReader {
    geometry: RingGeometry,
    header: Mmap,
    data: Mmap,
}

impl RingReader {
    /// Attach to an existing ring. Both segments must already exist and
    /// be large enough for the configured geometry.
    pub fn attach(
        header_path: &Path,
        data_path: &Path,
        geometry: RingGeometry,
    ) -> Result<Self, ShmError> {
        let header = segment::attach_readonly(header_path, geometry.header_len())?;
        let data = segment::attach_readonly(data_path, geometry.data_len())?;
        info!("Attached to shared memory at {}.", data_path.display());
        Ok(Self {
            geometry,
            header,
            data,
        })
    }

    pub fn geometry(&self) -> RingGeometry {
        self.geometry
    }

    /// Producer liveness flag from the header segment.
    pub fn active(&self) -> bool {
        read_u32(&self.header, HEADER_ACTIVE_OFFSET) != 0
    }

    /// Snapshot of the producer's write cursor.
    ///
    /// The two fields are read non-atomically; a torn snapshot is
    /// possible and tolerated by the realignment policy.
    pub fn read_cursor(&self) -> Cursor {
        Cursor {
            block: read_u32(&self.data, DATA_CURR_BLK_OFFSET),
            record: read_u32(&self.data, DATA_CURR_REC_OFFSET),
        }
    }

    /// Copy one slot into a caller-owned buffer.
    pub fn read_block(&self, record: u32, out: &mut [u8]) -> Result<(), ShmError> {
        if record >= self.geometry.capacity_blocks {
            return Err(ShmError::RecordOutOfRange {
                record,
                capacity: self.geometry.capacity_blocks,
            });
        }
        if out.len() != self.geometry.block_size {
            return Err(ShmError::BlockSizeMismatch {
                actual: out.len(),
                expected: self.geometry.block_size,
            });
        }
        out.copy_from_slice(&self.data[self.geometry.block_range(record)]);
        Ok(())
    }
}

/// Exclusive writer of the output ring.
pub struct RingWriter {
    geometry: RingGeometry,
    header: MmapMut,
    data: MmapMut,
}

impl RingWriter {
    /// Create the output ring, or take over an existing segment pair.
    ///
    /// Cursors are reset to zero and the `active` flag raised regardless
    /// of anything a previous run left behind: the output ring is
    /// treated as freshly owned on every start.
    pub fn create(
        header_path: &Path,
        data_path: &Path,
        geometry: RingGeometry,
    ) -> Result<Self, ShmError> {
        let header = segment::create_readwrite(header_path, geometry.header_len())?;
        let data = segment::create_readwrite(data_path, geometry.data_len())?;
        info!("Created shared memory at {}.", data_path.display());

        let mut writer = Self {
            geometry,
            header,
            data,
        };
        writer.write_u32(DATA_CURR_BLK_OFFSET, 0);
        writer.write_u32(DATA_CURR_REC_OFFSET, 0);
        writer.write_u32(DATA_BLK_SIZE_OFFSET, geometry.block_size as u32);
        writer.header[HEADER_ACTIVE_OFFSET..HEADER_ACTIVE_OFFSET + 4]
            .copy_from_slice(&1u32.to_le_bytes());
        Ok(writer)
    }

    fn write_u32(&mut self, offset: usize, value: u32) {
        self.data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    pub fn geometry(&self) -> RingGeometry {
        self.geometry
    }

    /// Copy one processed block into a slot. The slot is not visible to
    /// readers until the cursor is published.
    pub fn write_block(&mut self, record: u32, block: &[u8]) -> Result<(), ShmError> {
        if record >= self.geometry.capacity_blocks {
            return Err(ShmError::RecordOutOfRange {
                record,
                capacity: self.geometry.capacity_blocks,
            });
        }
        if block.len() != self.geometry.block_size {
            return Err(ShmError::BlockSizeMismatch {
                actual: block.len(),
                expected: self.geometry.block_size,
            });
        }
        let range = self.geometry.block_range(record);
        self.data[range].copy_from_slice(block);
        Ok(())
    }

    /// Publish the write cursor; written last, in keeping with the
    /// cursor-updated-last convention peers rely on.
    pub fn publish_cursor(&mut self, cursor: Cursor) {
        self.write_u32(DATA_CURR_REC_OFFSET, cursor.record);
        self.write_u32(DATA_CURR_BLK_OFFSET, cursor.block);
    }

    /// Current value of this ring's own write cursor.
    pub fn read_cursor(&self) -> Cursor {
        Cursor {
            block: read_u32(&self.data, DATA_CURR_BLK_OFFSET),
            record: read_u32(&self.data, DATA_CURR_REC_OFFSET),
        }
    }
}
