/*
 * Copyright 2025 Filigree contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Segment mapping helpers
//!
//! A segment is a plain file (normally under `/dev/shm`) mapped into the
//! process. Readers attach to an existing segment; writers create their
//! segment if absent, size it, and open it world-readable so downstream
//! consumers can attach.

use crate::ShmError;
use memmap2::{Mmap, MmapMut};
use std::fs::OpenOptions;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

/// Attach to an existing segment read-only.
pub(crate) fn attach_readonly(path: &Path, expected_len: usize) -> Result<Mmap, ShmError> {
    let file = OpenOptions::new().read(true).open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ShmError::SegmentMissing(path.to_path_buf())
        } else {
            ShmError::Map {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    // SAFETY: the mapping is read-only; concurrent producer writes can
    // yield torn reads, which the cursor protocol tolerates.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| ShmError::Map {
        path: path.to_path_buf(),
        source: e,
    })?;

    if mmap.len() < expected_len {
        return Err(ShmError::SizeMismatch {
            path: path.to_path_buf(),
            actual: mmap.len(),
            expected: expected_len,
        });
    }

    Ok(mmap)
}

/// Create (if absent) and map a segment read-write.
pub(crate) fn create_readwrite(path: &Path, len: usize) -> Result<MmapMut, ShmError> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create(true);
    #[cfg(unix)]
    options.mode(0o666); // rw-rw-rw-, downstream readers attach freely

    let file = options.open(path).map_err(|e| ShmError::Map {
        path: path.to_path_buf(),
        source: e,
    })?;

    file.set_len(len as u64).map_err(|e| ShmError::Map {
        path: path.to_path_buf(),
        source: e,
    })?;

    // SAFETY: this process is the only writer of the segment.
    let mmap = unsafe { MmapMut::map_mut(&file) }.map_err(|e| ShmError::Map {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(mmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_missing_segment_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-segment");
        assert!(matches!(
            attach_readonly(&path, 64),
            Err(ShmError::SegmentMissing(_))
        ));
    }

    #[test]
    fn test_attach_undersized_segment_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("segment");
        std::fs::write(&path, [0u8; 16]).unwrap();
        assert!(matches!(
            attach_readonly(&path, 64),
            Err(ShmError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_create_then_attach() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("segment");
        let mut mapped = create_readwrite(&path, 128).unwrap();
        mapped[0..4].copy_from_slice(&0xdeadbeefu32.to_le_bytes());
        mapped.flush().unwrap();

        let view = attach_readonly(&path, 128).unwrap();
        assert_eq!(
            u32::from_le_bytes([view[0], view[1], view[2], view[3]]),
            0xdeadbeef
        );
    }
}
