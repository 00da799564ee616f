// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Running latency aggregates and the per-strategy report block.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Strategy;

const NANOS_PER_SEC: f64 = 1e9;

/// Running total/max/min over the samples of one run, in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_ns: f64,
    pub max_ns: f64,
    pub min_ns: f64,
    pub samples: u32,
}

impl AggregateStats {
    pub fn new() -> Self {
        Self {
            total_ns: 0.0,
            max_ns: f64::MIN,
            min_ns: f64::MAX,
            samples: 0,
        }
    }

    /// Fold one elapsed-time sample into the aggregates.
    pub fn record(&mut self, elapsed_ns: f64) {
        if elapsed_ns > self.max_ns {
            self.max_ns = elapsed_ns;
        }
        if elapsed_ns < self.min_ns {
            self.min_ns = elapsed_ns;
        }
        self.total_ns += elapsed_ns;
        self.samples += 1;
    }

    /// Average sample in nanoseconds (NaN before the first sample).
    pub fn average_ns(&self) -> f64 {
        self.total_ns / f64::from(self.samples)
    }

    pub fn total_secs(&self) -> f64 {
        self.total_ns / NANOS_PER_SEC
    }

    pub fn max_secs(&self) -> f64 {
        self.max_ns / NANOS_PER_SEC
    }

    pub fn min_secs(&self) -> f64 {
        self.min_ns / NANOS_PER_SEC
    }

    pub fn average_secs(&self) -> f64 {
        self.average_ns() / NANOS_PER_SEC
    }
}

impl Default for AggregateStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Finished run of one strategy, rendered as the titled report block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyReport {
    pub strategy: Strategy,
    pub stats: AggregateStats,
}

impl fmt::Display for StrategyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.strategy.title())?;
        writeln!(f, "  total: {:.6}", self.stats.total_secs())?;
        writeln!(f, "  max:   {:.6}", self.stats.max_secs())?;
        writeln!(f, "  min:   {:.6}", self.stats.min_secs())?;
        writeln!(f, "  avg:   {:.6}", self.stats.average_secs())
    }
}
