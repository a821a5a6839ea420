/*
 * Copyright 2025 Filigree contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Burst descriptors
//!
//! A burst descriptor is a sparse time/frequency/flux representation of
//! one synthetic transient to weave into the stream. Descriptor files are
//! little-endian binary records:
//!
//! ```text
//! [0:4)    nrows   u32   time bins spanned by the burst
//! [4:8)    ncols   u32   frequency channels spanned
//! [8:12)   nnz     u32   non-negligible cells
//! [12:44)  dm, flux, width, t0   f64 each
//! then three parallel arrays of length nnz:
//!          rows    u32 each   time-bin offset from burst start
//!          cols    u32 each   frequency-channel index
//!          flux    f64 each   per-cell flux contribution, Jy
//! ```
//!
//! Rows are produced in non-decreasing time order, which lets the
//! injection engine stop scanning once a cell falls past the block.

use std::io;
use std::path::Path;

/// One non-negligible cell of a burst.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstCell {
    /// Time-bin offset from the burst start.
    pub row: u32,
    /// Frequency-channel index.
    pub col: u32,
    /// Flux contribution in this cell, Jy.
    pub flux: f64,
}

/// One synthetic transient to inject, immutable for the run.
#[derive(Debug, Clone)]
pub struct BurstDescriptor {
    /// Time bins spanned by the burst.
    pub nrows: u32,
    /// Frequency channels spanned by the burst.
    pub ncols: u32,
    /// Dispersion measure, pc cm^-3.
    pub dm: f64,
    /// Peak flux, Jy.
    pub flux: f64,
    /// Pulse width, s.
    pub width: f64,
    /// Burst start time, s.
    pub t0: f64,
    /// Sparse cells carrying signal; the noise floor elsewhere is
    /// untouched.
    pub cells: Vec<BurstCell>,
}

/// Errors reading a burst descriptor file
#[derive(Debug, thiserror::Error)]
pub enum BurstFileError {
    #[error("failed to read burst file: {0}")]
    Io(#[from] io::Error),

    #[error("burst file truncated: needed {needed} more bytes for {field}")]
    Truncated { field: &'static str, needed: usize },
}

/// Little-endian field reader over a byte slice.
struct FieldReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, len: usize, field: &'static str) -> Result<&'a [u8], BurstFileError> {
        let remaining = self.remaining();
        if remaining < len {
            return Err(BurstFileError::Truncated {
                field,
                needed: len - remaining,
            });
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_u32(&mut self, field: &'static str) -> Result<u32, BurstFileError> {
        let bytes = self.take(4, field)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_f64(&mut self, field: &'static str) -> Result<f64, BurstFileError> {
        let bytes = self.take(8, field)?;
        Ok(f64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }
}

impl BurstDescriptor {
    /// Parse a descriptor from its binary record.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BurstFileError> {
        let mut reader = FieldReader::new(bytes);

        let nrows = reader.read_u32("nrows")?;
        let ncols = reader.read_u32("ncols")?;
        let nnz = reader.read_u32("nnz")? as usize;
        let dm = reader.read_f64("dm")?;
        let flux = reader.read_f64("flux")?;
        let width = reader.read_f64("width")?;
        let t0 = reader.read_f64("t0")?;

        // The count comes from the file; check the arrays it promises
        // (4 + 4 + 8 bytes per cell) are actually there before sizing
        // any buffer from it.
        let needed = nnz as u64 * 16;
        if (reader.remaining() as u64) < needed {
            return Err(BurstFileError::Truncated {
                field: "cell arrays",
                needed: (needed - reader.remaining() as u64) as usize,
            });
        }

        let mut rows = Vec::with_capacity(nnz);
        for _ in 0..nnz {
            rows.push(reader.read_u32("rows")?);
        }
        let mut cols = Vec::with_capacity(nnz);
        for _ in 0..nnz {
            cols.push(reader.read_u32("cols")?);
        }
        let mut cells = Vec::with_capacity(nnz);
        for (&row, &col) in rows.iter().zip(cols.iter()) {
            cells.push(BurstCell {
                row,
                col,
                flux: reader.read_f64("flux values")?,
            });
        }

        Ok(Self {
            nrows,
            ncols,
            dm,
            flux,
            width,
            t0,
            cells,
        })
    }

    /// Load a descriptor file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BurstFileError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(&bytes)
    }

    /// True when the descriptor carries no signal at all.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Burst start time expressed as a sample-time bin.
    pub fn start_bin(&self, dt: f64) -> i64 {
        (self.t0 / dt).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(
        nrows: u32,
        ncols: u32,
        dm: f64,
        flux: f64,
        width: f64,
        t0: f64,
        cells: &[(u32, u32, f64)],
    ) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(nrows.to_le_bytes());
        bytes.extend(ncols.to_le_bytes());
        bytes.extend((cells.len() as u32).to_le_bytes());
        for value in [dm, flux, width, t0] {
            bytes.extend(value.to_le_bytes());
        }
        for &(row, _, _) in cells {
            bytes.extend(row.to_le_bytes());
        }
        for &(_, col, _) in cells {
            bytes.extend(col.to_le_bytes());
        }
        for &(_, _, cell_flux) in cells {
            bytes.extend(cell_flux.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_parse_descriptor() {
        let bytes = encode(
            64,
            256,
            565.0,
            2.5,
            3.2e-3,
            12.0,
            &[(0, 200, 1.5), (1, 180, 0.9), (5, 10, 0.2)],
        );
        let burst = BurstDescriptor::from_bytes(&bytes).unwrap();
        assert_eq!(burst.nrows, 64);
        assert_eq!(burst.ncols, 256);
        assert_eq!(burst.cells.len(), 3);
        assert_eq!(burst.cells[1].row, 1);
        assert_eq!(burst.cells[1].col, 180);
        assert!((burst.cells[1].flux - 0.9).abs() < 1e-15);
        assert!((burst.dm - 565.0).abs() < 1e-15);
        assert!(!burst.is_empty());
    }

    #[test]
    fn test_parse_empty_descriptor() {
        let bytes = encode(0, 0, 100.0, 1.0, 1e-3, 0.0, &[]);
        let burst = BurstDescriptor::from_bytes(&bytes).unwrap();
        assert!(burst.is_empty());
    }

    #[test]
    fn test_truncated_fails() {
        let bytes = encode(64, 256, 565.0, 2.5, 3.2e-3, 12.0, &[(0, 200, 1.5)]);
        let result = BurstDescriptor::from_bytes(&bytes[..bytes.len() - 4]);
        assert!(matches!(
            result,
            Err(BurstFileError::Truncated { field: "cell arrays", needed: 4 })
        ));
    }

    #[test]
    fn test_absurd_cell_count_is_rejected() {
        // A corrupt header claiming u32::MAX cells with none behind it
        // must fail the length check, not size a buffer from the claim.
        let mut bytes = Vec::new();
        bytes.extend(64u32.to_le_bytes());
        bytes.extend(256u32.to_le_bytes());
        bytes.extend(u32::MAX.to_le_bytes());
        for value in [565.0f64, 2.5, 3.2e-3, 12.0] {
            bytes.extend(value.to_le_bytes());
        }
        let result = BurstDescriptor::from_bytes(&bytes);
        assert!(matches!(
            result,
            Err(BurstFileError::Truncated { field: "cell arrays", .. })
        ));
    }

    #[test]
    fn test_start_bin_rounds() {
        let bytes = encode(1, 1, 0.0, 1.0, 1e-3, 12.0, &[(0, 0, 1.0)]);
        let burst = BurstDescriptor::from_bytes(&bytes).unwrap();
        assert_eq!(burst.start_bin(1.31072e-3), 9155);
    }

    #[test]
    fn test_from_file_round_trip() {
        let bytes = encode(8, 8, 300.0, 1.2, 2e-3, 1.0, &[(2, 3, 0.7)]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one_cell.burst");
        std::fs::write(&path, &bytes).unwrap();

        let burst = BurstDescriptor::from_file(&path).unwrap();
        assert_eq!(burst.cells, vec![BurstCell { row: 2, col: 3, flux: 0.7 }]);
    }
}
