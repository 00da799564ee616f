// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! spawnbench Benchmarking Framework
//!
//! Tools built on top of the core timing loop for studying how process
//! creation cost scales with the parent's resident set.
//!
//! # Benchmark Categories
//!
//! - **RSS sweep**: one strategy at a series of simulated RSS sizes
//! - **Criterion**: launch-and-reap latency per strategy (`benches/`)
//!
//! # Data Output
//!
//! Sweeps write a JSON report plus a `<strategy>.dat` series for plotting.

pub mod metrics;
pub mod reporter;
pub mod sweep;

pub use metrics::{SweepPoint, SweepReport, SystemInfo};
pub use reporter::JsonReporter;
pub use sweep::{rss_sizes, RssSweep};
