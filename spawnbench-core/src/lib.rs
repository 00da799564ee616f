//! spawnbench Core Library
//!
//! Measures the wall-clock cost of creating a process three ways:
//! `posix_spawn`, `fork` + `execvp`, and `vfork` + `execvp`, while the
//! parent holds a configurable, physically backed working set.
//! Provides typed configuration, the strategies, the resident-set
//! simulator, the timing loop and the driver that ties them together.

pub mod clock;
pub mod config;
pub mod driver;
pub mod error;
pub mod rss;
pub mod stats;
pub mod strategy;
pub mod timing;
pub mod types;

// Re-export commonly used types
pub use config::{BenchmarkConfig, ConfigLoader, ConfigOverrides};
pub use driver::Driver;
pub use error::{BenchError, BenchResult, ConfigError, LaunchError, ReapError, ResourceError};
pub use rss::SimulatedWorkingSet;
pub use stats::{AggregateStats, StrategyReport};
pub use strategy::Launcher;
pub use timing::TimingLoop;
pub use types::{IterationCount, ResidentSetSize, Strategy, StrategySelection, TargetProgram};
