// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::{OutputFormat, Traversal};

/// Command-line arguments for `dagsched`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dagsched",
    version,
    about = "Find a minimum-makespan schedule of a task DAG on identical processors.",
    long_about = None
)]
pub struct CliArgs {
    /// Task graph in DOT format (`Weight` attribute on every node and edge).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Number of identical processors to schedule onto.
    ///
    /// Parsed as a signed integer so that zero or negative values are reported
    /// as a configuration error rather than a parse error.
    #[arg(value_name = "PROCESSORS", allow_negative_numbers = true)]
    pub processors: i64,

    /// Path to the search config file (TOML).
    ///
    /// Default: `Dagsched.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of worker threads expanding the search frontier.
    #[arg(long, short = 'p', value_name = "N")]
    pub workers: Option<usize>,

    /// Frontier traversal order.
    #[arg(long, value_enum, value_name = "ORDER")]
    pub traversal: Option<Traversal>,

    /// Wall-clock search budget in seconds; the best schedule so far is
    /// reported (flagged as possibly non-optimal) when it runs out.
    #[arg(long, value_name = "SECS")]
    pub time_budget: Option<u64>,

    /// Disable duplicate-state memoization.
    #[arg(long)]
    pub no_memo: bool,

    /// Output format for the final schedule.
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the schedule to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DAGSCHED_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load + validate the graph and print a summary, but don't search.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_processor_count_is_accepted_by_parser() {
        let args = CliArgs::try_parse_from(["dagsched", "g.dot", "-2"]).unwrap();
        assert_eq!(args.processors, -2);
        assert!(args.workers.is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let args = CliArgs::try_parse_from([
            "dagsched",
            "g.dot",
            "3",
            "--workers",
            "4",
            "--traversal",
            "best-first",
            "--format",
            "dot",
            "--no-memo",
        ])
        .unwrap();
        assert_eq!(args.processors, 3);
        assert_eq!(args.workers, Some(4));
        assert_eq!(args.traversal, Some(Traversal::BestFirst));
        assert_eq!(args.format, Some(OutputFormat::Dot));
        assert!(args.no_memo);
    }
}
