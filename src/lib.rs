// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod graph;
pub mod logging;
pub mod schedule;
pub mod search;
pub mod types;

use std::fs;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::loader::{default_config_path, load_and_validate};
use crate::config::model::ConfigFile;
use crate::errors::DagschedError;
use crate::graph::{TaskGraph, load_dot};
use crate::schedule::{render_dot, render_triples};
use crate::search::{SearchHandle, SearchOptions, SearchOutcome, SearchTree};
use crate::types::OutputFormat;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file, then CLI overrides)
/// - DOT parsing
/// - the branch-and-bound search on a blocking thread
/// - Ctrl-C handling
/// - rendering the schedule
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_config(&args)?;
    let processors = processor_count(args.processors)?;
    let options = resolve_options(&args, &cfg, processors);
    let format = args.format.unwrap_or(cfg.output.format);

    let graph = load_dot(&args.input)
        .with_context(|| format!("failed to load task graph {}", args.input.display()))?;

    if args.dry_run {
        print_dry_run(&graph, &options);
        return Ok(());
    }

    let handle = SearchHandle::new();

    // Ctrl-C → stop the search and report the best schedule so far.
    {
        let handle = handle.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            warn!("interrupted; finishing with the best schedule found so far");
            handle.cancel();
        });
    }

    let (graph, outcome) = tokio::task::spawn_blocking(move || {
        let outcome = run_search(&graph, options, handle);
        (graph, outcome)
    })
    .await
    .context("search task failed to complete")?;
    let outcome = outcome?;

    info!(makespan = outcome.makespan(), optimal = outcome.optimal, "makespan");

    let rendered = render(&graph, &outcome, format);
    match &args.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("failed to write schedule to {}", path.display()))?;
            debug!(path = %path.display(), "schedule written");
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

/// Search `graph` with `options`, stopping early if `handle` is cancelled.
pub fn run_search(
    graph: &TaskGraph,
    options: SearchOptions,
    handle: SearchHandle,
) -> Result<SearchOutcome, DagschedError> {
    SearchTree::new(graph, options)?.with_handle(handle).run()
}

/// Render a finished search in the requested format, newline-terminated.
pub fn render(graph: &TaskGraph, outcome: &SearchOutcome, format: OutputFormat) -> String {
    match format {
        OutputFormat::Triples => {
            let mut out = render_triples(graph, &outcome.schedule);
            out.push('\n');
            out
        }
        OutputFormat::Dot => render_dot(graph, &outcome.schedule),
    }
}

/// Load the config named on the command line, or `Dagsched.toml` if it exists.
///
/// An explicit `--config` that does not exist is an error; a missing default
/// file just means built-in defaults.
pub fn load_config(args: &CliArgs) -> Result<ConfigFile> {
    match &args.config {
        Some(path) => load_and_validate(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => {
            let path = default_config_path();
            if path.is_file() {
                Ok(load_and_validate(&path)?)
            } else {
                debug!("no config file; using defaults");
                Ok(ConfigFile::default())
            }
        }
    }
}

/// Convert the raw processor argument, rejecting zero and negative counts.
pub fn processor_count(raw: i64) -> Result<usize, DagschedError> {
    if raw <= 0 {
        return Err(DagschedError::InvalidConfiguration(format!(
            "processor count must be at least 1 (got {raw})"
        )));
    }
    usize::try_from(raw).map_err(|_| {
        DagschedError::InvalidConfiguration(format!("processor count {raw} is too large"))
    })
}

/// Config-file options with command-line flags layered on top.
pub fn resolve_options(args: &CliArgs, cfg: &ConfigFile, processors: usize) -> SearchOptions {
    let mut options = cfg.search_options(processors);
    if let Some(workers) = args.workers {
        options.workers = workers;
    }
    if let Some(traversal) = args.traversal {
        options.traversal = traversal;
    }
    if let Some(secs) = args.time_budget {
        options.time_budget = (secs > 0).then(|| std::time::Duration::from_secs(secs));
    }
    if args.no_memo {
        options.memoize = false;
    }
    options
}

fn print_dry_run(graph: &TaskGraph, options: &SearchOptions) {
    println!("dagsched dry-run");
    println!("  graph = {}", if graph.name().is_empty() { "<unnamed>" } else { graph.name() });
    println!("  tasks = {}", graph.len());
    println!("  edges = {}", graph.edge_count());
    println!("  processors = {}", options.processors);
    println!("  workers = {}", options.workers);
    println!("  traversal = {}", options.traversal);
    println!("  memoize = {}", options.memoize);
    println!("  critical path = {}", graph.critical_path_length());
    println!("  total weight = {}", graph.total_weight());
    println!(
        "  lower bound = {}",
        crate::schedule::bound::problem_lower_bound(graph, options.processors)
    );

    debug!("dry-run complete (no search)");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Traversal;
    use clap::Parser;

    #[test]
    fn processor_count_rejects_non_positive() {
        assert!(matches!(
            processor_count(0),
            Err(DagschedError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            processor_count(-3),
            Err(DagschedError::InvalidConfiguration(_))
        ));
        assert_eq!(processor_count(4).unwrap(), 4);
    }

    #[test]
    fn cli_flags_override_config() {
        let args = CliArgs::try_parse_from([
            "dagsched",
            "g.dot",
            "2",
            "--workers",
            "3",
            "--traversal",
            "best-first",
            "--no-memo",
            "--time-budget",
            "0",
        ])
        .unwrap();
        let mut cfg = ConfigFile::default();
        cfg.search.time_budget_secs = Some(10);

        let opts = resolve_options(&args, &cfg, 2);
        assert_eq!(opts.processors, 2);
        assert_eq!(opts.workers, 3);
        assert_eq!(opts.traversal, Traversal::BestFirst);
        assert!(!opts.memoize);
        assert_eq!(opts.time_budget, None);
    }

    #[test]
    fn config_values_survive_without_flags() {
        let args = CliArgs::try_parse_from(["dagsched", "g.dot", "1"]).unwrap();
        let mut cfg = ConfigFile::default();
        cfg.search.workers = 6;
        cfg.search.time_budget_secs = Some(5);

        let opts = resolve_options(&args, &cfg, 1);
        assert_eq!(opts.workers, 6);
        assert_eq!(opts.time_budget, Some(std::time::Duration::from_secs(5)));
        assert!(opts.memoize);
    }
}
