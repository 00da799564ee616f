// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Runs every selected strategy in the fixed order and prints its block.

use std::io::Write;

use crate::config::BenchmarkConfig;
use crate::error::{BenchError, BenchResult};
use crate::stats::StrategyReport;
use crate::timing::TimingLoop;

/// Benchmark driver for one resolved configuration.
pub struct Driver {
    config: BenchmarkConfig,
}

impl Driver {
    pub fn new(config: BenchmarkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Run the selected strategies, writing each report as soon as it is done.
    ///
    /// Stops at the first error; reports already written stay written.
    /// An empty selection writes nothing and succeeds.
    pub fn run<W: Write>(&self, out: &mut W) -> BenchResult<Vec<StrategyReport>> {
        let timing = TimingLoop::new(
            self.config.iterations,
            self.config.rss_size,
            &self.config.target,
        );

        if self.config.selection.is_empty() {
            tracing::debug!("No benchmark selected");
        }

        let mut reports = Vec::new();
        for strategy in self.config.selection.iter() {
            let report = timing.run(strategy)?;

            write!(out, "{}", report).map_err(|source| BenchError::Io {
                context: "writing report",
                source,
            })?;
            out.flush().map_err(|source| BenchError::Io {
                context: "flushing report",
                source,
            })?;

            reports.push(report);
        }

        Ok(reports)
    }
}
