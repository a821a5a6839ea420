/*
 * Copyright 2025 Filigree contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Filigree
//!
//! Real-time signal-injection stage for a radio-telescope pipeline.
//! Filigree attaches to a producer's shared-memory ring buffer,
//! requantizes the bit depth where configured, weaves synthetic fast
//! radio bursts into the stream, and republishes the result into a
//! second ring for the transient search pipeline downstream.
//!
//! The umbrella crate carries the [`bridge`] loop tying the workspace
//! layers together; the algorithms live in `filigree-core`, the segment
//! accessors in `filigree-shm` and configuration in `filigree-config`.

pub mod bridge;
pub mod dump;

pub use bridge::{Bridge, BridgeError, BridgeState, BridgeStats, RunController, StepOutcome};
pub use dump::DumpSink;

// Re-export the layers so binary and tests use one coherent surface.
pub use filigree_config as config;
pub use filigree_core as core;
pub use filigree_shm as shm;
