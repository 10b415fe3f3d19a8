// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::search::SearchOptions;
use crate::types::{OutputFormat, Traversal};

/// Configuration exactly as read from TOML, before validation.
///
/// ```toml
/// [search]
/// workers = 4
/// traversal = "best-first"
/// memoize = true
/// memo_capacity = 1000000
/// time_budget_secs = 30
/// early_exit = true
/// greedy_incumbent = true
///
/// [output]
/// format = "triples"
/// ```
///
/// All sections and keys are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub search: SearchSection,

    #[serde(default)]
    pub output: OutputSection,
}

/// Validated configuration. Only constructible through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub search: SearchSection,
    pub output: OutputSection,
}

impl ConfigFile {
    /// Wrap already-validated sections.
    pub(crate) fn new_unchecked(search: SearchSection, output: OutputSection) -> Self {
        Self { search, output }
    }

    /// Search options for `processors` processors, taking everything else
    /// from the `[search]` section.
    pub fn search_options(&self, processors: usize) -> SearchOptions {
        SearchOptions {
            processors,
            workers: self.search.workers,
            traversal: self.search.traversal,
            memoize: self.search.memoize,
            memo_capacity: self.search.memo_capacity,
            time_budget: self.search.time_budget(),
            early_exit: self.search.early_exit,
            greedy_incumbent: self.search.greedy_incumbent,
        }
    }
}

/// `[search]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchSection {
    /// Worker threads expanding the frontier.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// `"depth-first"` (default) or `"best-first"`.
    #[serde(default)]
    pub traversal: Traversal,

    /// Skip states already reached through another decision order.
    #[serde(default = "default_true")]
    pub memoize: bool,

    /// Upper limit on remembered states.
    #[serde(default = "default_memo_capacity")]
    pub memo_capacity: usize,

    /// Wall-clock budget in seconds. `0` or absent means unlimited.
    #[serde(default)]
    pub time_budget_secs: Option<u64>,

    /// Stop once a schedule matches the whole-problem lower bound.
    #[serde(default = "default_true")]
    pub early_exit: bool,

    /// Seed the search with a list schedule.
    #[serde(default = "default_true")]
    pub greedy_incumbent: bool,
}

fn default_workers() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_memo_capacity() -> usize {
    1_000_000
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            traversal: Traversal::default(),
            memoize: true,
            memo_capacity: default_memo_capacity(),
            time_budget_secs: None,
            early_exit: true,
            greedy_incumbent: true,
        }
    }
}

impl SearchSection {
    pub fn time_budget(&self) -> Option<Duration> {
        match self.time_budget_secs {
            None | Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    #[serde(default)]
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let raw: RawConfigFile = toml::from_str("").unwrap();
        assert_eq!(raw.search.workers, 1);
        assert_eq!(raw.search.traversal, Traversal::DepthFirst);
        assert!(raw.search.memoize);
        assert_eq!(raw.search.time_budget(), None);
        assert_eq!(raw.output.format, OutputFormat::Triples);
    }

    #[test]
    fn full_file_round_trips_into_options() {
        let raw: RawConfigFile = toml::from_str(
            r#"
[search]
workers = 4
traversal = "best-first"
memoize = false
memo_capacity = 10
time_budget_secs = 30
early_exit = false
greedy_incumbent = false

[output]
format = "dot"
"#,
        )
        .unwrap();
        let cfg = ConfigFile::new_unchecked(raw.search, raw.output);
        let opts = cfg.search_options(3);
        assert_eq!(opts.processors, 3);
        assert_eq!(opts.workers, 4);
        assert_eq!(opts.traversal, Traversal::BestFirst);
        assert!(!opts.memoize);
        assert_eq!(opts.time_budget, Some(Duration::from_secs(30)));
        assert!(!opts.early_exit && !opts.greedy_incumbent);
        assert_eq!(cfg.output.format, OutputFormat::Dot);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<RawConfigFile>("[search]\nthreads = 2\n").is_err());
    }

    #[test]
    fn zero_budget_means_unlimited() {
        let raw: RawConfigFile = toml::from_str("[search]\ntime_budget_secs = 0\n").unwrap();
        assert_eq!(raw.search.time_budget(), None);
    }
}
