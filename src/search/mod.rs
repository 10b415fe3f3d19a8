// src/search/mod.rs

//! Branch-and-bound search over partial schedules.
//!
//! - [`tree`] drives the expansion loop, possibly on several worker threads.
//! - [`frontier`] holds open nodes in depth-first or best-first order.
//! - [`shared`] is the incumbent and the cancellation handle workers share.
//! - [`memo`] remembers state keys already queued so duplicate states reached
//!   through different decision orders are expanded once.
//! - [`greedy`] builds a quick complete schedule to seed the incumbent.

use std::time::Duration;

use crate::errors::{DagschedError, Result};
use crate::graph::TaskGraph;
use crate::schedule::PartialSchedule;
use crate::types::Traversal;

pub mod frontier;
pub mod greedy;
pub mod memo;
pub mod shared;
pub mod tree;

pub use frontier::Frontier;
pub use memo::VisitedSet;
pub use shared::{Incumbent, SearchHandle};
pub use tree::SearchTree;

/// Knobs for one search run.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Number of identical processors.
    pub processors: usize,
    /// Worker threads expanding the frontier.
    pub workers: usize,
    pub traversal: Traversal,
    /// Skip states whose content key has already been queued.
    pub memoize: bool,
    /// Maximum number of remembered state keys.
    pub memo_capacity: usize,
    /// Wall-clock budget; `None` searches to completion.
    pub time_budget: Option<Duration>,
    /// Stop as soon as an incumbent matches the whole-problem lower bound.
    pub early_exit: bool,
    /// Seed the incumbent with a list schedule before searching.
    pub greedy_incumbent: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            processors: 1,
            workers: 1,
            traversal: Traversal::DepthFirst,
            memoize: true,
            memo_capacity: 1_000_000,
            time_budget: None,
            early_exit: true,
            greedy_incumbent: true,
        }
    }
}

impl SearchOptions {
    pub fn with_processors(processors: usize) -> Self {
        Self {
            processors,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.processors == 0 {
            return Err(DagschedError::InvalidConfiguration(
                "processor count must be at least 1 (got 0)".to_string(),
            ));
        }
        if self.workers == 0 {
            return Err(DagschedError::InvalidConfiguration(
                "worker count must be at least 1 (got 0)".to_string(),
            ));
        }
        if self.memoize && self.memo_capacity == 0 {
            return Err(DagschedError::InvalidConfiguration(
                "memo capacity must be at least 1 when memoization is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

/// Counters summed over all workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes popped and expanded.
    pub expanded: u64,
    /// Children constructed.
    pub generated: u64,
    /// Nodes discarded because their bound reached the incumbent.
    pub pruned: u64,
    /// Children dropped as already-seen states.
    pub duplicates: u64,
    /// Complete schedules reached.
    pub leaves: u64,
    /// Times the incumbent improved (including the greedy seed).
    pub improvements: u64,
}

impl SearchStats {
    pub fn merge(&mut self, other: &SearchStats) {
        self.expanded += other.expanded;
        self.generated += other.generated;
        self.pruned += other.pruned;
        self.duplicates += other.duplicates;
        self.leaves += other.leaves;
        self.improvements += other.improvements;
    }
}

/// Result of a search run.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Best complete schedule found.
    pub schedule: PartialSchedule,
    /// `false` when the search was cancelled or ran out of time before it
    /// could prove this schedule minimal.
    pub optimal: bool,
    pub stats: SearchStats,
}

impl SearchOutcome {
    pub fn makespan(&self) -> u64 {
        self.schedule.makespan()
    }
}

/// Find a minimum-makespan schedule of `graph` on `processors` processors
/// with default options.
pub fn search(graph: &TaskGraph, processors: usize) -> Result<SearchOutcome> {
    SearchTree::new(graph, SearchOptions::with_processors(processors))?.run()
}
