/*
 * Copyright 2025 Filigree contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! Ring-buffer bridge
//!
//! The steady-state cycle is WAITING -> READING -> PROCESSING ->
//! PUBLISHING and back, one block per iteration, strictly in producer
//! order. The producer is a separate process with no shared
//! synchronization primitive, so WAITING is a short poll-sleep. When the
//! consumer falls `capacity - 1` blocks behind, the next read would
//! alias a slot the producer is about to overwrite; the bridge then
//! REALIGNS by snapping its cursor to the block just behind the
//! producer, silently dropping the stale blocks. Freshness over
//! completeness, by policy.

use crate::dump::DumpSink;
use filigree_core::{inject_burst, unpack_block, BlockSpan, BurstDescriptor, DeviateSource, InjectionParams};
use filigree_shm::{Cursor, RingReader, RingWriter, ShmError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Bridge errors surfaced out of the run loop.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Shm(#[from] ShmError),

    #[error("Could not write to debug dump: {0}")]
    Dump(#[from] std::io::Error),
}

/// Cancellation handle checked once per loop iteration.
///
/// Cloneable; the signal handler keeps one clone and flips the flag,
/// the loop holds another. Stopping never interrupts an iteration
/// mid-copy.
#[derive(Debug, Clone, Default)]
pub struct RunController {
    stop: Arc<AtomicBool>,
}

impl RunController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn should_run(&self) -> bool {
        !self.stop.load(Ordering::Relaxed)
    }
}

/// Bridge state, advanced once per iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Waiting,
    Reading,
    Processing,
    Publishing,
    Realigning,
}

/// Counters reported at shutdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct BridgeStats {
    pub blocks_consumed: u64,
    pub blocks_published: u64,
    pub realignments: u64,
    pub cells_injected: u64,
}

/// Outcome of one bridge iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// One block consumed, processed and published.
    Consumed { block: u32 },
    /// A stop was requested while waiting for the producer.
    Stopped,
}

/// The dual-ring bridge: pulls blocks from the producer's ring, runs
/// them through the requantizer and the injection engine, and
/// republishes them.
pub struct Bridge {
    input: RingReader,
    output: RingWriter,
    read_cursor: Cursor,
    write_cursor: Cursor,
    scratch: Vec<u8>,
    requantize: bool,
    params: InjectionParams,
    bursts: Vec<BurstDescriptor>,
    deviates: Box<dyn DeviateSource>,
    poll_interval: Duration,
    dump: Option<DumpSink>,
    state: BridgeState,
    stats: BridgeStats,
}

impl Bridge {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        input: RingReader,
        output: RingWriter,
        requantize: bool,
        params: InjectionParams,
        bursts: Vec<BurstDescriptor>,
        deviates: Box<dyn DeviateSource>,
        poll_interval: Duration,
        dump: Option<DumpSink>,
    ) -> Self {
        let block_size = input.geometry().block_size;
        Self {
            input,
            output,
            read_cursor: Cursor { block: 0, record: 0 },
            write_cursor: Cursor { block: 0, record: 0 },
            scratch: vec![0u8; block_size],
            requantize,
            params,
            bursts,
            deviates,
            poll_interval,
            dump,
            state: BridgeState::Waiting,
            stats: BridgeStats::default(),
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    /// Consumer cursor (next block to read). `record` always equals
    /// `block mod capacity`.
    pub fn read_cursor(&self) -> Cursor {
        self.read_cursor
    }

    /// Output cursor (next block to publish).
    pub fn write_cursor(&self) -> Cursor {
        self.write_cursor
    }

    /// Run until the controller requests a stop.
    pub fn run(&mut self, ctrl: &RunController) -> Result<(), BridgeError> {
        while ctrl.should_run() {
            match self.step(ctrl)? {
                StepOutcome::Consumed { .. } => {}
                StepOutcome::Stopped => break,
            }
        }
        let stats = self.stats;
        info!(
            "Bridge stopped: {} blocks consumed, {} published, {} realignments, {} cells injected.",
            stats.blocks_consumed, stats.blocks_published, stats.realignments, stats.cells_injected
        );
        if let Some(dump) = &mut self.dump {
            dump.flush()?;
            info!("Debug dump holds {} blocks.", dump.blocks());
        }
        Ok(())
    }

    /// One full bridge iteration: wait for a fresh producer block, check
    /// lag, read, process, publish, advance.
    pub fn step(&mut self, ctrl: &RunController) -> Result<StepOutcome, BridgeError> {
        // WAITING: poll the producer's cursor at a fixed short interval.
        self.state = BridgeState::Waiting;
        let mut announced = false;
        let producer = loop {
            if !ctrl.should_run() {
                return Ok(StepOutcome::Stopped);
            }
            let producer = self.input.read_cursor();
            if producer.block != self.read_cursor.block {
                break producer;
            }
            if !announced {
                debug!("Waiting...");
                announced = true;
            }
            thread::sleep(self.poll_interval);
        };
        if announced {
            debug!("Ready!");
        }

        debug!("Block being read = {}", self.read_cursor.block);
        debug!("Record being read = {}", self.read_cursor.record);
        debug!("Block being written = {}", producer.block);
        debug!("Record being written = {}", producer.record);

        // Lag check: one more block and the producer laps us.
        let capacity = self.input.geometry().capacity_blocks;
        if producer.block.wrapping_sub(self.read_cursor.block) >= capacity - 1 {
            self.state = BridgeState::Realigning;
            debug!("Realigning...");
            self.read_cursor.record = (producer.record + capacity - 1) % capacity;
            self.read_cursor.block = producer.block.wrapping_sub(1);
            self.stats.realignments += 1;
        }

        // READING: copy the slot into the per-iteration working block.
        self.state = BridgeState::Reading;
        self.input
            .read_block(self.read_cursor.record, &mut self.scratch)?;
        let consumed = self.read_cursor.block;
        self.stats.blocks_consumed += 1;

        // PROCESSING: requantize, then weave in overlapping bursts.
        self.state = BridgeState::Processing;
        if self.requantize {
            unpack_block(&mut self.scratch);
        }
        let span = BlockSpan::of_block(consumed, self.scratch.len());
        for burst in &self.bursts {
            let report = inject_burst(
                &mut self.scratch,
                span,
                burst,
                &self.params,
                self.deviates.as_mut(),
            );
            self.stats.cells_injected += report.cells_applied as u64;
        }

        // PUBLISHING: copy out, mirror to the dump, then advance the
        // published cursor last.
        self.state = BridgeState::Publishing;
        self.output
            .write_block(self.write_cursor.record, &self.scratch)?;
        if let Some(dump) = &mut self.dump {
            dump.write_block(&self.scratch)?;
        }

        self.read_cursor.block = self.read_cursor.block.wrapping_add(1);
        self.read_cursor.record = (self.read_cursor.record + 1) % capacity;

        let out_capacity = self.output.geometry().capacity_blocks;
        self.write_cursor.block = self.write_cursor.block.wrapping_add(1);
        self.write_cursor.record = (self.write_cursor.record + 1) % out_capacity;
        self.output.publish_cursor(self.write_cursor);
        self.stats.blocks_published += 1;

        self.state = BridgeState::Waiting;
        Ok(StepOutcome::Consumed { block: consumed })
    }
}
