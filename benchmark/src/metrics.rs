// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Result types for RSS sweeps.
//!
//! A sweep runs one strategy at a series of simulated resident-set sizes.
//! These structures capture each point's aggregates plus enough context
//! about the host to compare sweeps taken on different machines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spawnbench_core::{AggregateStats, ResidentSetSize, Strategy};
use sysinfo::System;

/// Aggregates for one simulated RSS size, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Simulated resident-set size in bytes
    pub rss_bytes: u32,
    /// Same size in MiB (the x axis of the .dat output)
    pub rss_mib: f64,
    pub total_secs: f64,
    pub max_secs: f64,
    pub min_secs: f64,
    pub avg_secs: f64,
    /// Number of launches measured
    pub iterations: u32,
}

impl SweepPoint {
    pub fn new(rss_size: ResidentSetSize, stats: &AggregateStats) -> Self {
        Self {
            rss_bytes: rss_size.bytes(),
            rss_mib: rss_size.mebibytes(),
            total_secs: stats.total_secs(),
            max_secs: stats.max_secs(),
            min_secs: stats.min_secs(),
            avg_secs: stats.average_secs(),
            iterations: stats.samples,
        }
    }

    /// Format a latency in seconds in human-readable form (auto-selects ns/μs/ms).
    pub fn format_latency(secs: f64) -> String {
        let ns = secs * 1e9;
        if ns < 1_000.0 {
            format!("{:.0}ns", ns)
        } else if ns < 1_000_000.0 {
            format!("{:.2}μs", ns / 1_000.0)
        } else if ns < 1_000_000_000.0 {
            format!("{:.2}ms", ns / 1_000_000.0)
        } else {
            format!("{:.2}s", secs)
        }
    }
}

/// System information captured at benchmark time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system name
    pub os: String,
    /// OS version
    pub os_version: String,
    /// Kernel version (Linux)
    pub kernel_version: Option<String>,
    /// CPU model name
    pub cpu_model: String,
    /// Number of CPU cores
    pub cpu_cores: usize,
    /// Total system memory in bytes
    pub memory_bytes: u64,
    /// Hostname
    pub hostname: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Complete sweep of one strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    /// Suite identifier
    pub benchmark_suite: String,
    /// Framework version
    pub version: String,
    /// Timestamp when the sweep was started
    pub timestamp: DateTime<Utc>,
    /// System information
    pub system_info: SystemInfo,
    /// Strategy under measurement
    pub strategy: Strategy,
    /// Program launched on every iteration
    pub target: String,
    /// One entry per simulated RSS size, in sweep order
    pub points: Vec<SweepPoint>,
}

impl SweepReport {
    /// Create a new, empty report for `strategy`.
    pub fn new(strategy: Strategy, target: impl Into<String>) -> Self {
        Self {
            benchmark_suite: "spawnbench-rss-sweep".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            system_info: SystemInfo::collect(),
            strategy,
            target: target.into(),
            points: Vec::new(),
        }
    }

    /// Add a point to the report.
    pub fn add_point(&mut self, point: SweepPoint) {
        self.points.push(point);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(samples: &[f64]) -> AggregateStats {
        let mut stats = AggregateStats::new();
        for &s in samples {
            stats.record(s);
        }
        stats
    }

    #[test]
    fn test_point_from_stats() {
        let point = SweepPoint::new(
            ResidentSetSize::from_mib(50).unwrap(),
            &stats(&[1_000_000.0, 3_000_000.0]),
        );

        assert_eq!(point.rss_bytes, 50 * 1024 * 1024);
        assert!((point.rss_mib - 50.0).abs() < 1e-9);
        assert!((point.total_secs - 0.004).abs() < 1e-12);
        assert!((point.avg_secs - 0.002).abs() < 1e-12);
        assert!((point.max_secs - 0.003).abs() < 1e-12);
        assert!((point.min_secs - 0.001).abs() < 1e-12);
        assert_eq!(point.iterations, 2);
    }

    #[test]
    fn test_latency_format() {
        assert_eq!(SweepPoint::format_latency(500e-9), "500ns");
        assert_eq!(SweepPoint::format_latency(1500e-9), "1.50μs");
        assert_eq!(SweepPoint::format_latency(1.5e-3), "1.50ms");
        assert_eq!(SweepPoint::format_latency(1.5), "1.50s");
    }

    #[test]
    fn test_system_info_collect() {
        let info = SystemInfo::collect();
        assert!(!info.os.is_empty());
        assert!(info.cpu_cores > 0);
        assert!(info.memory_bytes > 0);
    }

    #[test]
    fn test_report_serialization() {
        let mut report = SweepReport::new(Strategy::VforkExec, "/bin/true");
        report.add_point(SweepPoint::new(ResidentSetSize::new(4096), &stats(&[100.0])));

        let json = serde_json::to_string_pretty(&report).unwrap();
        assert!(json.contains("vfork_exec"));
        assert!(json.contains("rss_bytes"));
        assert!(json.contains("/bin/true"));
    }
}
