// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Timing loop: launch, reap, measure, repeat.
//!
//! One run maps a simulated working set, then performs `iterations`
//! sequential launch-to-reap measurements of a single strategy. There is
//! never more than one unreaped child. Any failure aborts the run and no
//! partial statistics are returned.

use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::Pid;

use crate::clock::Timestamp;
use crate::error::{BenchResult, ReapError};
use crate::rss::SimulatedWorkingSet;
use crate::stats::{AggregateStats, StrategyReport};
use crate::strategy::Launcher;
use crate::types::{IterationCount, ResidentSetSize, Strategy, TargetProgram};

/// Drives repeated launches of one strategy.
pub struct TimingLoop<'a> {
    iterations: IterationCount,
    rss_size: ResidentSetSize,
    target: &'a TargetProgram,
}

impl<'a> TimingLoop<'a> {
    pub fn new(
        iterations: IterationCount,
        rss_size: ResidentSetSize,
        target: &'a TargetProgram,
    ) -> Self {
        Self {
            iterations,
            rss_size,
            target,
        }
    }

    /// Benchmark one of the built-in strategies.
    pub fn run(&self, strategy: Strategy) -> BenchResult<StrategyReport> {
        let stats = self.measure(strategy.name(), &strategy)?;
        Ok(StrategyReport { strategy, stats })
    }

    /// Benchmark any launcher and return its aggregates.
    pub fn measure<L>(&self, name: &str, launcher: &L) -> BenchResult<AggregateStats>
    where
        L: Launcher + ?Sized,
    {
        let working_set = SimulatedWorkingSet::acquire(self.rss_size)?;

        tracing::debug!(
            strategy = name,
            iterations = self.iterations.get(),
            rss_bytes = self.rss_size.bytes(),
            program = %self.target,
            "Starting timing run"
        );

        let mut stats = AggregateStats::new();
        for _ in 0..self.iterations.get() {
            let before = Timestamp::now()?;
            let pid = launcher.launch(self.target)?;
            reap(pid)?;
            let after = Timestamp::now()?;

            let elapsed_ns = after.nanos_since(&before);
            tracing::trace!(strategy = name, pid = pid.as_raw(), elapsed_ns, "Launch reaped");
            stats.record(elapsed_ns);
        }

        working_set.release()?;

        tracing::debug!(
            strategy = name,
            total_ns = stats.total_ns,
            avg_ns = stats.average_ns(),
            "Finished timing run"
        );

        Ok(stats)
    }
}

/// Block until exactly `pid` has terminated.
fn reap(pid: Pid) -> Result<WaitStatus, ReapError> {
    let status = waitpid(pid, None).map_err(|source| ReapError::WaitFailed {
        pid: pid.as_raw(),
        source,
    })?;

    if status.pid() != Some(pid) {
        return Err(ReapError::UnexpectedPid {
            expected: pid.as_raw(),
            actual: status.pid().map(Pid::as_raw),
        });
    }

    if !matches!(status, WaitStatus::Exited(_, 0)) {
        tracing::debug!(pid = pid.as_raw(), status = ?status, "Child did not exit cleanly");
    }

    Ok(status)
}
