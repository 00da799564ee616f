// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Runs one strategy across a range of simulated RSS sizes.

use spawnbench_core::{
    BenchResult, ConfigError, IterationCount, ResidentSetSize, Strategy, TargetProgram,
    TimingLoop,
};

use crate::metrics::{SweepPoint, SweepReport};

/// Sizes from `start_mib` (inclusive) to `end_mib` (exclusive) in steps of `step_mib`.
pub fn rss_sizes(start_mib: u32, end_mib: u32, step_mib: u32) -> Result<Vec<ResidentSetSize>, ConfigError> {
    if step_mib == 0 {
        return Err(ConfigError::InvalidNumber {
            flag: "--step-mib",
            value: "0".to_string(),
            reason: "step must be greater than zero".to_string(),
        });
    }

    (start_mib..end_mib)
        .step_by(step_mib as usize)
        .map(ResidentSetSize::from_mib)
        .collect()
}

/// A sweep of one strategy over several RSS sizes.
pub struct RssSweep {
    strategy: Strategy,
    iterations: IterationCount,
    target: TargetProgram,
    sizes: Vec<ResidentSetSize>,
}

impl RssSweep {
    pub fn new(
        strategy: Strategy,
        iterations: IterationCount,
        target: TargetProgram,
        sizes: Vec<ResidentSetSize>,
    ) -> Self {
        Self {
            strategy,
            iterations,
            target,
            sizes,
        }
    }

    /// Run the timing loop once per size, calling `on_point` after each one.
    pub fn run<F>(&self, mut on_point: F) -> BenchResult<SweepReport>
    where
        F: FnMut(&SweepPoint),
    {
        let mut report = SweepReport::new(self.strategy, self.target.to_string());

        for &rss_size in &self.sizes {
            let timing = TimingLoop::new(self.iterations, rss_size, &self.target);
            let stats = timing.run(self.strategy)?.stats;

            let point = SweepPoint::new(rss_size, &stats);
            on_point(&point);
            report.add_point(point);
        }

        Ok(report)
    }
}
