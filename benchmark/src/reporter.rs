// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Report generation for RSS sweeps.
//!
//! Writes a timestamped JSON file per sweep and a plain `<strategy>.dat`
//! file with one `rss_mib avg_secs` pair per line for plotting tools.

use crate::metrics::SweepReport;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Writer for sweep results.
pub struct JsonReporter {
    /// Output directory for benchmark data
    output_dir: PathBuf,
}

impl JsonReporter {
    /// Create a new reporter with the specified output directory.
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, ReporterError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// Save a sweep report to a JSON file.
    ///
    /// Returns the path to the created file.
    pub fn save(&self, report: &SweepReport) -> Result<PathBuf, ReporterError> {
        let timestamp = report.timestamp.format("%Y-%m-%dT%H-%M-%SZ");
        let filename = format!("{}_{}.json", report.strategy, timestamp);
        let filepath = self.output_dir.join(&filename);

        let file = File::create(&filepath)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, report)?;

        Ok(filepath)
    }

    /// Write the `(rss_mib, avg_secs)` series to `<strategy>.dat`.
    pub fn save_dat(&self, report: &SweepReport) -> Result<PathBuf, ReporterError> {
        let filepath = self.output_dir.join(format!("{}.dat", report.strategy));

        let mut writer = BufWriter::new(File::create(&filepath)?);
        for point in &report.points {
            writeln!(writer, "{:.6} {:.6}", point.rss_mib, point.avg_secs)?;
        }
        writer.flush()?;

        Ok(filepath)
    }
}
