// src/search/tree.rs

//! The branch-and-bound driver.
//!
//! Each worker repeatedly pops a node from the shared frontier, expands it
//! into one child per (available task, candidate processor) pair, and pushes
//! the children that survive three filters:
//! - complete children are offered to the incumbent instead of queued;
//! - children whose lower bound is not below the incumbent are pruned;
//! - children whose state key was queued before are dropped as duplicates.
//!
//! Candidate processors are the ones already in use plus the lowest-indexed
//! empty one: empty processors are interchangeable, so trying more than one
//! of them only explores relabelled copies of the same schedules.

use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::errors::{DagschedError, Result};
use crate::graph::TaskGraph;
use crate::schedule::PartialSchedule;
use crate::schedule::bound::problem_lower_bound;
use crate::search::frontier::Frontier;
use crate::search::greedy;
use crate::search::memo::VisitedSet;
use crate::search::shared::{Incumbent, SearchHandle, lock};
use crate::search::{SearchOptions, SearchOutcome, SearchStats};

/// How long an idle worker sleeps before re-checking for cancellation.
const IDLE_POLL: Duration = Duration::from_millis(20);

/// Emit a progress line every this many expansions per worker.
const PROGRESS_EVERY: u64 = 100_000;

/// Branch-and-bound search for a minimum-makespan schedule.
#[derive(Debug)]
pub struct SearchTree<'g> {
    graph: &'g TaskGraph,
    options: SearchOptions,
    handle: SearchHandle,
}

impl<'g> SearchTree<'g> {
    /// Fails with `InvalidConfiguration` for unusable options.
    pub fn new(graph: &'g TaskGraph, options: SearchOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            graph,
            options,
            handle: SearchHandle::new(),
        })
    }

    /// Use an externally owned cancellation handle (e.g. wired to Ctrl-C).
    pub fn with_handle(mut self, handle: SearchHandle) -> Self {
        self.handle = handle;
        self
    }

    pub fn handle(&self) -> SearchHandle {
        self.handle.clone()
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Run the search to completion, early exit, or cancellation.
    pub fn run(&self) -> Result<SearchOutcome> {
        let started = Instant::now();
        let root = PartialSchedule::root(self.graph, self.options.processors)?;
        let problem_bound = problem_lower_bound(self.graph, self.options.processors);

        info!(
            tasks = self.graph.len(),
            edges = self.graph.edge_count(),
            processors = self.options.processors,
            workers = self.options.workers,
            traversal = %self.options.traversal,
            lower_bound = problem_bound,
            "starting branch-and-bound search"
        );

        let shared = Shared::new(
            self.graph,
            &self.options,
            self.handle.clone(),
            problem_bound,
            started,
        );

        let mut stats = SearchStats::default();

        if self.options.greedy_incumbent {
            let seed = greedy::list_schedule(self.graph, &root)?;
            debug!(makespan = seed.makespan(), "greedy incumbent");
            shared.offer(seed, &mut stats);
        }

        if shared.reached_bound.load(Ordering::Acquire) {
            shared.exhausted.store(true, Ordering::Release);
        } else {
            lock(&shared.open).frontier.push(root.clone());
            stats.merge(&self.run_workers(&shared)?);
        }

        if let Some(err) = lock(&shared.first_error).take() {
            return Err(err);
        }

        let optimal = shared.exhausted.load(Ordering::Acquire)
            || shared.reached_bound.load(Ordering::Acquire);

        let schedule = match shared.incumbent.into_schedule() {
            Some(s) => s,
            // Cancelled before any complete schedule was seen.
            None => greedy::list_schedule(self.graph, &root)?,
        };

        if optimal {
            info!(
                makespan = schedule.makespan(),
                expanded = stats.expanded,
                pruned = stats.pruned,
                duplicates = stats.duplicates,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "search finished with an optimal schedule"
            );
        } else {
            warn!(
                makespan = schedule.makespan(),
                expanded = stats.expanded,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "search stopped early; schedule may not be optimal"
            );
        }

        Ok(SearchOutcome {
            schedule,
            optimal,
            stats,
        })
    }

    fn run_workers(&self, shared: &Shared<'_>) -> Result<SearchStats> {
        let workers = self.options.workers;
        if workers == 1 {
            return Ok(worker(shared));
        }

        let per_worker = thread::scope(|scope| -> Result<Vec<SearchStats>> {
            let mut handles = Vec::with_capacity(workers);
            for i in 0..workers {
                let handle = thread::Builder::new()
                    .name(format!("dagsched-worker-{i}"))
                    .spawn_scoped(scope, || worker(shared))?;
                handles.push(handle);
            }

            // Join every worker before reporting, so a panic never escapes the scope.
            let mut results = Vec::with_capacity(workers);
            let mut panicked = 0;
            for handle in handles {
                match handle.join() {
                    Ok(stats) => results.push(stats),
                    Err(_) => panicked += 1,
                }
            }
            if panicked > 0 {
                return Err(DagschedError::Other(anyhow::anyhow!(
                    "{panicked} search worker(s) panicked"
                )));
            }
            Ok(results)
        })?;

        let mut total = SearchStats::default();
        for s in &per_worker {
            total.merge(s);
        }
        Ok(total)
    }
}

/// Frontier plus the number of nodes currently being expanded.
///
/// The search is over only when both are zero: a busy worker may still push
/// children.
struct OpenSet {
    frontier: Frontier,
    busy: usize,
}

struct Shared<'g> {
    graph: &'g TaskGraph,
    early_exit: bool,
    problem_bound: u64,
    open: Mutex<OpenSet>,
    wakeup: Condvar,
    incumbent: Incumbent,
    memo: Option<VisitedSet>,
    handle: SearchHandle,
    deadline: Option<Instant>,
    /// An incumbent matched the whole-problem lower bound.
    reached_bound: AtomicBool,
    /// Frontier drained with no worker busy.
    exhausted: AtomicBool,
    /// A worker hit an error or panicked.
    aborted: AtomicBool,
    first_error: Mutex<Option<DagschedError>>,
}

impl<'g> Shared<'g> {
    fn new(
        graph: &'g TaskGraph,
        options: &SearchOptions,
        handle: SearchHandle,
        problem_bound: u64,
        started: Instant,
    ) -> Self {
        Self {
            graph,
            early_exit: options.early_exit,
            problem_bound,
            open: Mutex::new(OpenSet {
                frontier: Frontier::new(options.traversal),
                busy: 0,
            }),
            wakeup: Condvar::new(),
            incumbent: Incumbent::new(),
            memo: options
                .memoize
                .then(|| VisitedSet::new(options.memo_capacity)),
            handle,
            deadline: options.time_budget.map(|budget| started + budget),
            reached_bound: AtomicBool::new(false),
            exhausted: AtomicBool::new(false),
            aborted: AtomicBool::new(false),
            first_error: Mutex::new(None),
        }
    }

    fn should_stop(&self) -> bool {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline && !self.handle.is_cancelled() {
                warn!("search time budget exhausted; cancelling");
                self.handle.cancel();
            }
        }
        self.handle.is_cancelled()
            || self.reached_bound.load(Ordering::Acquire)
            || self.aborted.load(Ordering::Acquire)
    }

    /// Block until a node is available or the search is over.
    fn next_node(&self) -> Option<PartialSchedule> {
        let mut open = lock(&self.open);
        loop {
            if self.should_stop() {
                return None;
            }
            if let Some(node) = open.frontier.pop() {
                open.busy += 1;
                return Some(node);
            }
            if open.busy == 0 {
                self.exhausted.store(true, Ordering::Release);
                self.wakeup.notify_all();
                return None;
            }
            open = self
                .wakeup
                .wait_timeout(open, IDLE_POLL)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    fn fail(&self, err: DagschedError) {
        let mut slot = lock(&self.first_error);
        if slot.is_none() {
            *slot = Some(err);
        }
        self.aborted.store(true, Ordering::Release);
    }

    fn offer(&self, schedule: PartialSchedule, stats: &mut SearchStats) {
        let cost = schedule.cost();
        if self.incumbent.offer(schedule) {
            stats.improvements += 1;
            info!(makespan = cost, "found better schedule");
            if self.early_exit && cost <= self.problem_bound {
                debug!(
                    makespan = cost,
                    "incumbent matches the problem lower bound; stopping"
                );
                self.reached_bound.store(true, Ordering::Release);
            }
        }
    }

    fn expand(
        &self,
        node: &PartialSchedule,
        stats: &mut SearchStats,
    ) -> Result<Vec<PartialSchedule>> {
        // The incumbent may have improved since this node was queued.
        if node.cost() >= self.incumbent.cost() {
            stats.pruned += 1;
            return Ok(Vec::new());
        }
        stats.expanded += 1;

        let available = node.available_tasks();
        if available.is_empty() {
            return Err(DagschedError::InvalidGraph(format!(
                "no available task with {} of {} tasks scheduled; the graph contains a cycle",
                node.scheduled_count(),
                node.task_count()
            )));
        }

        let processors = (node.processors_used() + 1).min(node.processors());
        let mut children = Vec::with_capacity(available.len() * processors);

        for &task in &available {
            for processor in 0..processors {
                let child = PartialSchedule::child(node, self.graph, task, processor)?;
                stats.generated += 1;

                if child.is_complete() {
                    stats.leaves += 1;
                    self.offer(child, stats);
                    continue;
                }
                if child.cost() >= self.incumbent.cost() {
                    stats.pruned += 1;
                    continue;
                }
                if let Some(memo) = &self.memo {
                    if !memo.insert(child.state_key()) {
                        stats.duplicates += 1;
                        continue;
                    }
                }
                children.push(child);
            }
        }

        Ok(children)
    }
}

/// One expansion in progress. Dropping it hands the children to the frontier
/// and releases the busy slot, also when the expansion panicked.
struct InFlight<'s, 'g> {
    shared: &'s Shared<'g>,
    children: Vec<PartialSchedule>,
}

impl Drop for InFlight<'_, '_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.shared.aborted.store(true, Ordering::Release);
        }
        {
            let mut open = lock(&self.shared.open);
            open.frontier.push_children(mem::take(&mut self.children));
            open.busy -= 1;
        }
        self.shared.wakeup.notify_all();
    }
}

fn worker(shared: &Shared<'_>) -> SearchStats {
    let mut stats = SearchStats::default();
    let mut next_report = PROGRESS_EVERY;

    while let Some(node) = shared.next_node() {
        let mut in_flight = InFlight {
            shared,
            children: Vec::new(),
        };
        match shared.expand(&node, &mut stats) {
            Ok(children) => in_flight.children = children,
            Err(err) => shared.fail(err),
        }
        drop(in_flight);

        if stats.expanded >= next_report {
            next_report += PROGRESS_EVERY;
            debug!(
                expanded = stats.expanded,
                pruned = stats.pruned,
                duplicates = stats.duplicates,
                best = shared.incumbent.cost(),
                "search progress"
            );
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Traversal;

    fn options(processors: usize) -> SearchOptions {
        SearchOptions::with_processors(processors)
    }

    fn exhaustive(processors: usize) -> SearchOptions {
        SearchOptions {
            greedy_incumbent: false,
            early_exit: false,
            ..options(processors)
        }
    }

    fn fork_join() -> TaskGraph {
        TaskGraph::builder()
            .task("a", 2)
            .task("b", 3)
            .task("c", 3)
            .task("d", 2)
            .edge("a", "b", 1)
            .edge("a", "c", 1)
            .edge("b", "d", 1)
            .edge("c", "d", 1)
            .build()
            .unwrap()
    }

    #[test]
    fn single_task() {
        let g = TaskGraph::builder().task("t1", 5).build().unwrap();
        let out = SearchTree::new(&g, options(1)).unwrap().run().unwrap();
        assert!(out.optimal);
        assert_eq!(out.makespan(), 5);
        assert_eq!(out.schedule.assignments().len(), 1);
    }

    #[test]
    fn fork_join_optimum() {
        // a(0-2) and b(2-5) on p0, c(3-6) and d(6-8) on p1.
        let g = fork_join();
        let out = SearchTree::new(&g, exhaustive(2)).unwrap().run().unwrap();
        assert!(out.optimal);
        assert_eq!(out.makespan(), 8);

        let serial = SearchTree::new(&g, exhaustive(1)).unwrap().run().unwrap();
        assert_eq!(serial.makespan(), 10);
    }

    #[test]
    fn search_modes_agree() {
        let g = fork_join();
        let base = SearchTree::new(&g, exhaustive(3)).unwrap().run().unwrap();

        let variants = [
            SearchOptions {
                traversal: Traversal::BestFirst,
                ..exhaustive(3)
            },
            SearchOptions {
                memoize: false,
                ..exhaustive(3)
            },
            SearchOptions {
                workers: 4,
                ..exhaustive(3)
            },
            options(3),
        ];
        for opts in variants {
            let out = SearchTree::new(&g, opts.clone()).unwrap().run().unwrap();
            assert!(out.optimal, "{opts:?}");
            assert_eq!(out.makespan(), base.makespan(), "{opts:?}");
        }
    }

    #[test]
    fn memoization_drops_duplicates() {
        let g = TaskGraph::builder()
            .task("a", 1)
            .task("b", 1)
            .task("c", 1)
            .task("d", 1)
            .build()
            .unwrap();
        let id = |n: &str| g.id_of(n).unwrap();
        let opts = exhaustive(2);
        let shared = Shared::new(&g, &opts, SearchHandle::new(), 2, Instant::now());

        let root = PartialSchedule::root(&g, 2).unwrap();
        let a = PartialSchedule::child(&root, &g, id("a"), 0).unwrap();
        let ab = PartialSchedule::child(&a, &g, id("b"), 1).unwrap();
        let ac = PartialSchedule::child(&a, &g, id("c"), 0).unwrap();

        let mut stats = SearchStats::default();
        let first = shared.expand(&ab, &mut stats).unwrap();
        assert_eq!(first.len(), 4);
        assert_eq!(stats.duplicates, 0);

        // ac + b on p1 is the same state as ab + c on p0.
        let second = shared.expand(&ac, &mut stats).unwrap();
        assert_eq!(second.len(), 3);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.generated, 8);
    }

    #[test]
    fn only_one_empty_processor_is_tried() {
        let g = TaskGraph::builder().task("a", 1).task("b", 1).build().unwrap();
        let out = SearchTree::new(&g, exhaustive(4)).unwrap().run().unwrap();
        // Root: 2 tasks on the one empty processor. Then the remaining task on
        // p0 or the first empty processor; the sibling root child is pruned.
        assert_eq!(out.stats.generated, 2 + 2);
        assert_eq!(out.stats.leaves, 2);
        assert_eq!(out.stats.pruned, 1);
        assert_eq!(out.makespan(), 1);
    }

    #[test]
    fn pre_cancelled_search_reports_non_optimal_schedule() {
        let g = fork_join();
        let tree = SearchTree::new(&g, exhaustive(2)).unwrap();
        tree.handle().cancel();
        let out = tree.run().unwrap();
        assert!(!out.optimal);
        assert!(out.schedule.is_complete());
        assert_eq!(out.stats.expanded, 0);
    }

    #[test]
    fn zero_time_budget_stops_immediately() {
        let g = fork_join();
        let opts = SearchOptions {
            time_budget: Some(Duration::ZERO),
            ..exhaustive(2)
        };
        let out = SearchTree::new(&g, opts).unwrap().run().unwrap();
        assert!(!out.optimal);
        assert!(out.schedule.is_complete());
    }

    #[test]
    fn early_exit_skips_search_when_greedy_is_tight() {
        let g = TaskGraph::builder().task("a", 3).task("b", 4).build().unwrap();
        let out = SearchTree::new(&g, options(2)).unwrap().run().unwrap();
        assert!(out.optimal);
        assert_eq!(out.makespan(), 4);
        assert_eq!(out.stats.expanded, 0);
        assert_eq!(out.stats.improvements, 1);
    }

    #[test]
    fn huge_processor_count_behaves_like_one_per_task() {
        let g = fork_join();
        let started = Instant::now();
        let wide = SearchTree::new(&g, exhaustive(1_000_000_000_000))
            .unwrap()
            .run()
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(wide.optimal);
        assert_eq!(wide.schedule.processors(), 4);

        let narrow = SearchTree::new(&g, exhaustive(4)).unwrap().run().unwrap();
        assert_eq!(wide.makespan(), narrow.makespan());
        assert_eq!(wide.stats, narrow.stats);
    }

    #[test]
    fn zero_processors_is_invalid_configuration() {
        let g = fork_join();
        assert!(matches!(
            SearchTree::new(&g, options(0)),
            Err(DagschedError::InvalidConfiguration(_))
        ));
    }
}
