//! Custom error types for spawnbench.
//!
//! Every failure the harness can hit is an explicit enum variant. None of
//! them are recoverable: the CLI renders the error and exits non-zero, so
//! a partially measured run never produces a report.

use std::path::PathBuf;

use nix::errno::Errno;
use thiserror::Error;

/// Top-level error type for a benchmark invocation.
#[derive(Debug, Error)]
pub enum BenchError {
    // =========================================================================
    // Configuration Errors - Reported Before Any Strategy Runs
    // =========================================================================
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    // =========================================================================
    // Simulated Working Set Errors
    // =========================================================================
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    // =========================================================================
    // Process Launch / Reap Errors - No Retry
    // =========================================================================
    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),

    #[error("Reap error: {0}")]
    Reap(#[from] ReapError),

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("clock_gettime failed: {0}")]
    Clock(#[source] Errno),

    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Invalid configuration values, from flags or from a profile file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid input argument for {flag}: {value} - {reason}")]
    InvalidNumber {
        flag: &'static str,
        value: String,
        reason: String,
    },

    #[error("iteration count must be greater than zero")]
    ZeroIterations,

    #[error("target program path contains an interior NUL byte: {path}")]
    InvalidTargetPath { path: PathBuf },

    #[error("configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("configuration parse error: {message}")]
    Parse { message: String },
}

/// Failures of the resident-set simulator.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("mmap of {size} bytes failed: {source}")]
    MapFailed {
        size: usize,
        #[source]
        source: Errno,
    },

    #[error("munmap of {size} bytes failed: {source}")]
    UnmapFailed {
        size: usize,
        #[source]
        source: Errno,
    },
}

/// Failures reported by a launch primitive in the parent.
///
/// Image-replace failures never show up here: they happen in the child
/// branch, which reports them itself and exits.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("posix_spawn failed: {0}")]
    PosixSpawn(#[source] Errno),

    #[error("fork failed: {0}")]
    Fork(#[source] Errno),

    #[error("clone(CLONE_VM | CLONE_VFORK) failed: {0}")]
    Vfork(#[source] Errno),
}

/// Failures while waiting for a specific child.
#[derive(Debug, Error)]
pub enum ReapError {
    #[error("waitpid failure for pid {pid}: {source}")]
    WaitFailed {
        pid: i32,
        #[source]
        source: Errno,
    },

    #[error("waitpid for pid {expected} reported pid {actual:?}")]
    UnexpectedPid { expected: i32, actual: Option<i32> },
}

/// Result type alias using BenchError.
pub type BenchResult<T> = Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidNumber {
            flag: "-i",
            value: "abc".to_string(),
            reason: "invalid digit found in string".to_string(),
        };
        assert!(err.to_string().contains("-i"));
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_launch_error_names_call() {
        let err: BenchError = LaunchError::PosixSpawn(Errno::ENOENT).into();
        assert!(matches!(err, BenchError::Launch(_)));
        assert!(err.to_string().contains("posix_spawn"));
    }

    #[test]
    fn test_reap_error_names_call() {
        let err = ReapError::WaitFailed {
            pid: 42,
            source: Errno::ECHILD,
        };
        assert!(err.to_string().contains("waitpid"));
        assert!(err.to_string().contains("42"));
    }
}
