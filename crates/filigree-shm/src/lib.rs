/*
 * Copyright 2025 Filigree contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Filigree Shared Memory
//!
//! Memory-mapped ring-buffer segments, byte-compatible with the
//! acquisition system's C structs. Each ring is two segments: a small
//! header (liveness and timing) and a data segment (cursors plus the
//! circular block array). The binary layout contract lives entirely in
//! [`layout`]; everything else manipulates opaque block handles through
//! the [`RingReader`]/[`RingWriter`] accessors.
//!
//! There is no locking and no memory-barrier discipline across
//! processes: peers rely on cursor fields being updated last, and
//! readers tolerate an occasional torn or stale view (the bridge's
//! realignment policy handles the fallout).

pub mod layout;
pub mod ring;
mod segment;

pub use layout::RingGeometry;
pub use ring::{Cursor, RingReader, RingWriter};

use std::path::PathBuf;

/// Shared-memory errors; all of them are fatal setup errors.
#[derive(Debug, thiserror::Error)]
pub enum ShmError {
    #[error("Shared memory segment does not exist: {0}")]
    SegmentMissing(PathBuf),

    #[error("Could not map shared memory segment {path}: {source}")]
    Map {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Segment {path} is {actual} bytes, expected {expected}")]
    SizeMismatch {
        path: PathBuf,
        actual: usize,
        expected: usize,
    },

    #[error("Record {record} out of range for capacity {capacity}")]
    RecordOutOfRange { record: u32, capacity: u32 },

    #[error("Block is {actual} bytes, ring blocks are {expected}")]
    BlockSizeMismatch { actual: usize, expected: usize },
}
