// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI tool to sweep one strategy over simulated RSS sizes.

use anyhow::Context;
use clap::Parser;
use spawnbench_benchmark::{rss_sizes, JsonReporter, RssSweep, SweepPoint};
use spawnbench_core::types::DEFAULT_TARGET;
use spawnbench_core::{IterationCount, Strategy, TargetProgram};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rss_sweep")]
#[command(about = "Measure one spawn strategy at increasing simulated RSS sizes")]
struct Args {
    /// What to benchmark
    #[arg(value_parser = ["posix_spawn", "fork_exec", "vfork_exec"])]
    benchmark: String,

    /// First RSS size in MiB
    #[arg(long, default_value_t = 50)]
    start_mib: u32,

    /// Upper bound in MiB (exclusive)
    #[arg(long, default_value_t = 500)]
    end_mib: u32,

    /// Increment in MiB
    #[arg(long, default_value_t = 50)]
    step_mib: u32,

    /// Launches per RSS size
    #[arg(short, long, default_value_t = 10_000)]
    iterations: u32,

    /// Program to launch
    #[arg(long, default_value = DEFAULT_TARGET)]
    target: PathBuf,

    /// Output directory for sweep data
    #[arg(short, long, default_value = "data")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let strategy = Strategy::from_name(&args.benchmark)
        .with_context(|| format!("unknown benchmark {}", args.benchmark))?;
    let sizes = rss_sizes(args.start_mib, args.end_mib, args.step_mib)?;
    let sweep = RssSweep::new(
        strategy,
        IterationCount::new(args.iterations)?,
        TargetProgram::new(&args.target)?,
        sizes,
    );

    println!("spawnbench RSS sweep");
    println!("====================");
    println!("Benchmark: {}", strategy);
    println!("Iterations: {}", args.iterations);
    println!();

    let reporter = JsonReporter::new(&args.output)?;
    let report = sweep.run(|point| {
        println!(
            "  ✓ rss={:.0}MiB avg={} max={} min={}",
            point.rss_mib,
            SweepPoint::format_latency(point.avg_secs),
            SweepPoint::format_latency(point.max_secs),
            SweepPoint::format_latency(point.min_secs),
        );
    })?;

    let json = reporter.save(&report)?;
    let dat = reporter.save_dat(&report)?;
    println!();
    println!("Sweep report saved to: {:?}", json);
    println!("Series saved to: {:?}", dat);

    Ok(())
}
