/*
 * Copyright 2025 Filigree contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Debug dump sink
//!
//! When debugging is enabled, every fully processed block is appended to
//! a raw file, in block order, so the stream can be inspected offline.
//! The sink has no opinion about the bytes beyond that.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct DumpSink {
    path: PathBuf,
    writer: BufWriter<File>,
    blocks: u64,
}

impl DumpSink {
    /// Create (truncating) the dump file. Failure here is a fatal setup
    /// error for the caller.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            blocks: 0,
        })
    }

    /// Append one processed block.
    pub fn write_block(&mut self, block: &[u8]) -> io::Result<()> {
        self.writer.write_all(block)?;
        self.blocks += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn blocks(&self) -> u64 {
        self.blocks
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_appends_in_block_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.raw");
        let mut sink = DumpSink::create(&path).unwrap();
        sink.write_block(&[1, 2, 3, 4]).unwrap();
        sink.write_block(&[5, 6, 7, 8]).unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.blocks(), 2);
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }
}
