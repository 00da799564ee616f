// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! spawnbench CLI
//!
//! Command-line interface for the process-creation benchmark.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, CommandFactory, Parser};
use spawnbench_core::types::{DEFAULT_ITERATIONS, DEFAULT_RSS_SIZE};
use spawnbench_core::{
    BenchResult, BenchmarkConfig, ConfigLoader, ConfigOverrides, Driver, IterationCount,
    ResidentSetSize, StrategySelection,
};

/// spawnbench - compare posix_spawn, fork+exec and vfork+exec latency
#[derive(Parser)]
#[command(name = "spawnbench")]
#[command(author, version, about, long_about = None)]
#[command(disable_help_flag = true, args_override_self = true)]
pub struct Cli {
    /// Benchmark to run: posix_spawn, fork_exec or vfork_exec (default all)
    #[arg(short = 'b', value_name = "NAME")]
    pub benchmark: Option<String>,

    #[arg(short = 'i', value_name = "COUNT", help = format!("Number of iterations (default {})", DEFAULT_ITERATIONS))]
    pub iterations: Option<String>,

    #[arg(short = 'r', value_name = "BYTES", help = format!("Memory to allocate, in bytes (default {})", DEFAULT_RSS_SIZE))]
    pub rss_size: Option<String>,

    /// YAML profile with defaults for the other options
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print help
    #[arg(short = 'h', long = "help", action = ArgAction::SetTrue)]
    pub help: bool,
}

impl Cli {
    /// Overrides given directly on the command line.
    ///
    /// Numbers are validated here rather than by clap so that `-h` is
    /// honoured even when another flag carries a bad value.
    fn overrides(&self) -> BenchResult<ConfigOverrides> {
        let iterations = self
            .iterations
            .as_deref()
            .map(|v| IterationCount::parse("-i", v))
            .transpose()?;
        let rss_size = self
            .rss_size
            .as_deref()
            .map(|v| ResidentSetSize::parse("-r", v))
            .transpose()?;

        Ok(ConfigOverrides {
            iterations,
            rss_size,
            selection: self.benchmark.as_deref().map(StrategySelection::from_name),
            target: None,
        })
    }

    /// Resolve defaults, the optional profile and the flags.
    fn resolve(&self) -> BenchResult<BenchmarkConfig> {
        let mut config = BenchmarkConfig::default();

        if let Some(path) = &self.config {
            config = config.with_overrides(ConfigLoader::load_file(path)?);
        }

        Ok(config.with_overrides(self.overrides()?))
    }
}

fn run(cli: &Cli) -> BenchResult<()> {
    let config = cli.resolve()?;

    tracing::debug!(
        iterations = config.iterations.get(),
        rss_bytes = config.rss_size.bytes(),
        program = %config.target,
        "Resolved configuration"
    );

    let stdout = std::io::stdout();
    Driver::new(config).run(&mut stdout.lock())?;
    Ok(())
}

/// True when `-h`/`--help` appears anywhere among the raw arguments.
fn help_requested<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .any(|arg| matches!(arg.as_ref(), "-h" | "--help"))
}

fn main() -> ExitCode {
    // Help wins over every other argument, including ones clap rejects.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(_) if help_requested(std::env::args().skip(1)) => {
            print!("{}", Cli::command().render_help());
            return ExitCode::SUCCESS;
        }
        Err(e) => e.exit(),
    };

    if cli.help {
        print!("{}", Cli::command().render_help());
        return ExitCode::SUCCESS;
    }

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Benchmark aborted");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spawnbench_core::Strategy;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("spawnbench").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).resolve().unwrap();
        assert_eq!(config.iterations.get(), DEFAULT_ITERATIONS);
        assert_eq!(config.rss_size.bytes(), DEFAULT_RSS_SIZE);
        assert_eq!(config.selection, StrategySelection::all());
    }

    #[test]
    fn test_flags() {
        let config = parse(&["-i", "5", "-r", "4096", "-b", "posix_spawn"])
            .resolve()
            .unwrap();
        assert_eq!(config.iterations.get(), 5);
        assert_eq!(config.rss_size.bytes(), 4096);
        assert_eq!(config.selection, StrategySelection::only(Strategy::PosixSpawn));
    }

    #[test]
    fn test_last_occurrence_wins() {
        let config = parse(&["-b", "fork_exec", "-b", "vfork_exec", "-i", "1", "-i", "2"])
            .resolve()
            .unwrap();
        assert_eq!(config.selection, StrategySelection::only(Strategy::VforkExec));
        assert_eq!(config.iterations.get(), 2);
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        assert!(parse(&["-i", "4294967296"]).resolve().is_err());
        assert!(parse(&["-r", "abc"]).resolve().is_err());
        assert!(parse(&["-i", "0"]).resolve().is_err());
    }

    #[test]
    fn test_help_parses_with_bad_values() {
        let cli = parse(&["-i", "abc", "-h"]);
        assert!(cli.help);
    }

    #[test]
    fn test_help_requested_from_raw_args() {
        assert!(help_requested(["-h", "-x"]));
        assert!(help_requested(["-x", "-h"]));
        assert!(help_requested(["-h", "-i"]));
        assert!(help_requested(["--bogus", "--help"]));
        assert!(!help_requested(["-x", "-i", "5"]));
        assert!(!help_requested(Vec::<String>::new()));
    }

    #[test]
    fn test_unknown_flag_is_parse_error() {
        let args = ["spawnbench", "-h", "-x"];
        assert!(Cli::try_parse_from(args).is_err());
        assert!(help_requested(&args[1..]));
    }

    #[test]
    fn test_unknown_benchmark_selects_nothing() {
        let config = parse(&["-b", "spawn"]).resolve().unwrap();
        assert!(config.selection.is_empty());
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }
}
