// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark configuration: defaults, YAML profiles and flag overrides.
//!
//! Values are resolved in three layers, later layers winning:
//! built-in defaults, an optional YAML profile, then command-line flags.
//! The result is an immutable `BenchmarkConfig`.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::{IterationCount, ResidentSetSize, StrategySelection, TargetProgram};

/// Raw profile as parsed from YAML (before validation).
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProfile {
    iterations: Option<u32>,
    rss_size: Option<u32>,
    benchmarks: Option<Vec<String>>,
    target: Option<String>,
}

/// Validated overrides coming from a profile file or from flags.
///
/// `None` leaves the lower layer's value in place.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub iterations: Option<IterationCount>,
    pub rss_size: Option<ResidentSetSize>,
    pub selection: Option<StrategySelection>,
    pub target: Option<TargetProgram>,
}

/// Fully resolved benchmark configuration.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkConfig {
    pub iterations: IterationCount,
    pub rss_size: ResidentSetSize,
    pub selection: StrategySelection,
    pub target: TargetProgram,
}

impl BenchmarkConfig {
    /// Apply one layer of overrides on top of this configuration.
    pub fn with_overrides(self, overrides: ConfigOverrides) -> Self {
        Self {
            iterations: overrides.iterations.unwrap_or(self.iterations),
            rss_size: overrides.rss_size.unwrap_or(self.rss_size),
            selection: overrides.selection.unwrap_or(self.selection),
            target: overrides.target.unwrap_or(self.target),
        }
    }
}

/// Profile loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate a YAML profile from a file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<ConfigOverrides, ConfigError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Parse {
                    message: format!("reading {}: {}", path.display(), e),
                }
            }
        })?;

        Self::load_string(&content)
    }

    /// Load and validate a YAML profile from a string.
    pub fn load_string(content: &str) -> Result<ConfigOverrides, ConfigError> {
        // An empty document is a profile that overrides nothing
        if content.trim().is_empty() {
            return Ok(ConfigOverrides::default());
        }

        let raw: RawProfile = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            message: format!("YAML parse error: {}", e),
        })?;

        Self::validate(raw)
    }

    fn validate(raw: RawProfile) -> Result<ConfigOverrides, ConfigError> {
        let iterations = raw.iterations.map(IterationCount::new).transpose()?;
        let target = raw.target.map(TargetProgram::new).transpose()?;

        Ok(ConfigOverrides {
            iterations,
            rss_size: raw.rss_size.map(ResidentSetSize::new),
            selection: raw.benchmarks.map(StrategySelection::from_names),
            target,
        })
    }
}
