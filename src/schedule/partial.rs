// src/schedule/partial.rs

use std::sync::Arc;

use tracing::trace;

use crate::errors::{DagschedError, Result};
use crate::graph::{TaskGraph, TaskId};
use crate::schedule::bound;
use crate::schedule::table::StateTable;
use crate::schedule::task_state::TaskState;

/// One committed decision: `task` runs on `processor` starting at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub task: TaskId,
    pub processor: usize,
    pub start: u64,
}

/// Content key of a partial schedule: digest of every scheduled task's
/// `(processor, start)` in task id order. Two schedules reached through
/// different decision orders share a key exactly when their futures are
/// identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateKey(pub [u8; 32]);

/// Persistent cons list of committed tasks, newest first.
#[derive(Debug)]
struct PathNode {
    task: TaskId,
    prev: Option<Arc<PathNode>>,
}

/// Immutable node of the search tree.
///
/// Holds the decision order (`path`), one [`TaskState`] per task, and the
/// per-processor ready times that follow from them. Children are built with
/// [`PartialSchedule::child`]; the parent is never modified.
#[derive(Debug, Clone)]
pub struct PartialSchedule {
    path: Option<Arc<PathNode>>,
    path_len: usize,
    states: StateTable,
    /// End of the last task committed to each processor.
    ready: Vec<u64>,
    /// Processors `0..processors_used` have at least one task.
    processors_used: usize,
    makespan: u64,
    remaining_weight: u64,
    cost: u64,
}

impl PartialSchedule {
    /// Root of the search tree: nothing scheduled, every task waiting on its
    /// full in-degree.
    ///
    /// At most one processor per task is ever used, so `processors` is
    /// clamped to the task count; [`processors`](Self::processors) reports
    /// the clamped value.
    pub fn root(graph: &TaskGraph, processors: usize) -> Result<Self> {
        if graph.is_empty() {
            return Err(DagschedError::InvalidGraph(
                "graph must contain at least one task".to_string(),
            ));
        }
        if processors == 0 {
            return Err(DagschedError::InvalidConfiguration(
                "processor count must be at least 1".to_string(),
            ));
        }

        let states = StateTable::from_states(
            graph.ids().map(|id| TaskState::unscheduled(graph.in_degree(id))),
        );

        let root = Self {
            path: None,
            path_len: 0,
            states,
            ready: vec![0; processors.min(graph.len())],
            processors_used: 0,
            makespan: 0,
            remaining_weight: graph.total_weight(),
            cost: 0,
        };

        if root.available_tasks().is_empty() {
            return Err(DagschedError::InvalidGraph(
                "no task is schedulable at the start; the graph contains a cycle".to_string(),
            ));
        }

        Ok(root)
    }

    /// Commit `task` to `processor` on top of `parent`.
    ///
    /// `task` must be available in `parent` and `processor` must be in
    /// `0..processors()`; anything else is a [`DagschedError::Precondition`].
    pub fn child(
        parent: &PartialSchedule,
        graph: &TaskGraph,
        task: TaskId,
        processor: usize,
    ) -> Result<Self> {
        if task.index() >= parent.states.len() {
            return Err(DagschedError::Precondition {
                task: task.to_string(),
                detail: format!("task id out of range for a graph of {} tasks", parent.states.len()),
            });
        }
        if processor >= parent.ready.len() {
            return Err(DagschedError::Precondition {
                task: graph.task_name(task).to_string(),
                detail: format!(
                    "processor {} out of range (processor count {})",
                    processor,
                    parent.ready.len()
                ),
            });
        }

        let current = parent.states.get(task.index());
        if !current.is_available() {
            return Err(DagschedError::Precondition {
                task: graph.task_name(task).to_string(),
                detail: format!(
                    "task is not available: expected remaining_predecessors == 0, found {}",
                    current.remaining_predecessors()
                ),
            });
        }

        let start = parent.earliest_start(graph, task, processor);
        let finish = start + graph.weight(task);

        let mut states = parent.states.clone();
        states.set(task.index(), current.scheduled_on(processor, start));
        for &(succ, _) in graph.successors(task) {
            let s = states.get(succ.index());
            states.set(succ.index(), s.with_one_fewer_predecessor());
        }

        let mut ready = parent.ready.clone();
        ready[processor] = finish;

        let mut next = Self {
            path: Some(Arc::new(PathNode {
                task,
                prev: parent.path.clone(),
            })),
            path_len: parent.path_len + 1,
            states,
            ready,
            processors_used: parent.processors_used.max(processor + 1),
            makespan: parent.makespan.max(finish),
            remaining_weight: parent.remaining_weight - graph.weight(task),
            cost: 0,
        };
        next.cost = if next.is_complete() {
            next.makespan
        } else {
            bound::lower_bound(graph, &next)
        };

        trace!(
            task = graph.task_name(task),
            processor,
            start,
            depth = next.path_len,
            cost = next.cost,
            "committed task"
        );

        Ok(next)
    }

    /// Start time `task` would get if appended to `processor` now.
    ///
    /// Later of: every predecessor's finish (plus the edge's communication
    /// cost when the predecessor ran elsewhere), and the end of the last task
    /// already on `processor`. Unscheduled predecessors are ignored.
    pub fn earliest_start(&self, graph: &TaskGraph, task: TaskId, processor: usize) -> u64 {
        let data_ready = graph
            .predecessors(task)
            .iter()
            .filter_map(|&(pred, comm)| {
                let p = self.states.get(pred.index());
                if !p.is_scheduled() {
                    return None;
                }
                let finish = p.start_time() + graph.weight(pred);
                Some(if p.processor() == processor {
                    finish
                } else {
                    finish + comm
                })
            })
            .max()
            .unwrap_or(0);

        data_ready.max(self.ready[processor])
    }

    /// Tasks whose predecessors are all scheduled, in graph task order.
    pub fn available_tasks(&self) -> Vec<TaskId> {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_available())
            .map(|(i, _)| TaskId(i as u32))
            .collect()
    }

    /// Makespan for a complete schedule, an admissible lower bound otherwise
    /// (`0` at the root).
    pub fn cost(&self) -> u64 {
        self.cost
    }

    /// Finish time of the latest task scheduled so far.
    pub fn makespan(&self) -> u64 {
        self.makespan
    }

    pub fn is_complete(&self) -> bool {
        self.path_len == self.states.len()
    }

    pub fn scheduled_count(&self) -> usize {
        self.path_len
    }

    pub fn task_count(&self) -> usize {
        self.states.len()
    }

    pub fn state(&self, task: TaskId) -> TaskState {
        self.states.get(task.index())
    }

    pub fn states(&self) -> &StateTable {
        &self.states
    }

    pub fn processors(&self) -> usize {
        self.ready.len()
    }

    pub fn processors_used(&self) -> usize {
        self.processors_used
    }

    pub fn processor_ready(&self, processor: usize) -> u64 {
        self.ready[processor]
    }

    pub fn remaining_weight(&self) -> u64 {
        self.remaining_weight
    }

    /// Committed tasks in decision order.
    pub fn path(&self) -> Vec<TaskId> {
        let mut out = Vec::with_capacity(self.path_len);
        let mut node = self.path.as_deref();
        while let Some(n) = node {
            out.push(n.task);
            node = n.prev.as_deref();
        }
        out.reverse();
        out
    }

    /// `(task, processor, start)` for every committed task, in decision order.
    pub fn assignments(&self) -> Vec<Assignment> {
        self.path()
            .into_iter()
            .map(|task| {
                let s = self.states.get(task.index());
                Assignment {
                    task,
                    processor: s.processor(),
                    start: s.start_time(),
                }
            })
            .collect()
    }

    pub fn state_key(&self) -> StateKey {
        let mut hasher = blake3::Hasher::new();
        for (i, s) in self.states.iter().enumerate() {
            if s.is_scheduled() {
                hasher.update(&(i as u32).to_le_bytes());
                hasher.update(&(s.processor() as u32).to_le_bytes());
                hasher.update(&s.start_time().to_le_bytes());
            }
        }
        StateKey(*hasher.finalize().as_bytes())
    }
}
