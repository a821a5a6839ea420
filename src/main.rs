/*
 * Copyright 2025 Filigree contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use filigree::config::{load_config, FiligreeConfig};
use filigree::core::{BitDepth, BurstDescriptor, InjectionParams, RunDeviates};
use filigree::shm::{RingGeometry, RingReader, RingWriter};
use filigree::{Bridge, DumpSink, RunController};

/// Filigree - weaves synthetic fast radio bursts into live telescope data
#[derive(Parser, Debug)]
#[command(name = "filigree", version, author, long_about = None)]
struct Args {
    /// Path to the configuration file (default: filigree_configuration.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Burst descriptor file to weave in (repeatable)
    #[arg(short, long)]
    burst: Vec<PathBuf>,

    /// Fixed RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Enable debug logging and dump every published block to disk
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = load_config(args.config.as_deref()).context("Could not load configuration")?;
    print_banner(&config);

    // Descriptor files from the config, then anything given on the CLI.
    let mut burst_paths = config.bursts.files.clone();
    burst_paths.extend(args.burst.iter().cloned());
    if burst_paths.is_empty() {
        warn!("No burst descriptor files were given.");
        warn!("Filigree won't weave anything into the stream.");
    }
    let mut bursts = Vec::with_capacity(burst_paths.len());
    for path in &burst_paths {
        let burst = BurstDescriptor::from_file(path)
            .with_context(|| format!("Could not read burst file {}", path.display()))?;
        info!(
            "Loaded burst from {}: DM = {:.2}, flux = {:.2} Jy, t0 = {:.3} s.",
            path.display(),
            burst.dm,
            burst.flux,
            burst.t0
        );
        bursts.push(burst);
    }

    let geometry = RingGeometry {
        capacity_blocks: config.rings.capacity_blocks,
        block_size: config.rings.block_size,
    };
    let input = RingReader::attach(&config.rings.input_header, &config.rings.input_data, geometry)
        .context("Could not attach to the producer's ring")?;
    let output = RingWriter::create(
        &config.rings.output_header,
        &config.rings.output_data,
        geometry,
    )
    .context("Could not create the output ring")?;

    let dump = if args.debug {
        let sink = DumpSink::create(&config.debug.dump_path)
            .with_context(|| format!("Could not open {}", config.debug.dump_path.display()))?;
        info!("Dumping published blocks to {}.", sink.path().display());
        Some(sink)
    } else {
        None
    };

    let radiometer = config.radiometer();
    let bit_depth = BitDepth::try_from(config.system.bit_depth)
        .map_err(|depth| anyhow::anyhow!("Unsupported bit depth: {depth}"))?;
    let params = InjectionParams {
        nf: config.system.nf,
        dt: config.system.dt,
        sigma: radiometer.sigma(),
        level_width: config.system.level_width,
        bit_depth,
        flip_band: config.system.flip_band,
    };

    let deviates = match args.seed {
        Some(seed) => {
            info!("Deviates seeded with {seed}.");
            RunDeviates::from_seed(seed)
        }
        None => RunDeviates::from_clock(),
    };

    let ctrl = RunController::new();
    let handler = ctrl.clone();
    ctrlc::set_handler(move || {
        info!("Shutdown requested.");
        handler.request_stop();
    })
    .context("Could not install the signal handler")?;

    let mut bridge = Bridge::new(
        input,
        output,
        bit_depth == BitDepth::Two,
        params,
        bursts,
        Box::new(deviates),
        Duration::from_millis(config.rings.poll_interval_ms),
        dump,
    );

    info!("Bridge running; stop with Ctrl-C.");
    bridge.run(&ctrl)?;
    Ok(())
}

fn print_banner(config: &FiligreeConfig) {
    let radiometer = config.radiometer();
    info!("Filigree v{}", env!("CARGO_PKG_VERSION"));
    info!("Start time = {:.3} s", config.system.t1);
    info!("End time = {:.3} s", config.system.t2);
    info!("Number of channels = {}", radiometer.nf);
    info!("Frequency range = {:.1} - {:.1} MHz", radiometer.f1, radiometer.f2);
    info!("Bandwidth = {:.1} MHz", radiometer.bw);
    info!("Channel width = {:.6} MHz", radiometer.df);
    info!("Sampling time = {:.6} s", radiometer.dt);
    info!("System temperature = {:.1} K", radiometer.tsys);
    info!("Gain = {:.3} K/Jy", radiometer.gain);
    info!("Noise sigma = {:.3} Jy", radiometer.sigma());
    info!("Level width = {:.2} sigma", radiometer.level_width);
    info!("Bit depth = {}", config.system.bit_depth);
    info!(
        "Ring geometry = {} blocks of {} bytes",
        config.rings.capacity_blocks, config.rings.block_size
    );
}
