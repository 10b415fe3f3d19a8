// src/graph/task_graph.rs

use std::collections::HashMap;
use std::fmt;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::errors::{DagschedError, Result};

/// Dense task index, assigned once in declaration order.
///
/// All per-task search state is stored in arrays indexed by this id, so the
/// search never hashes task names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u32);

impl TaskId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Internal node structure: weight plus immediate neighbours with the
/// communication cost of the connecting edge.
#[derive(Debug, Clone)]
struct TaskNode {
    name: String,
    weight: u64,
    preds: Vec<(TaskId, u64)>,
    succs: Vec<(TaskId, u64)>,
    /// Longest weight-only path from this task to any exit, own weight included.
    bottom_level: u64,
}

/// Immutable task DAG consumed by the search.
///
/// Built through [`TaskGraphBuilder`], which rejects empty graphs, unknown
/// endpoints, duplicate edges and cycles, so every `TaskGraph` is a valid DAG.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    name: String,
    nodes: Vec<TaskNode>,
    by_name: HashMap<String, TaskId>,
    edge_count: usize,
    total_weight: u64,
    critical_path: u64,
}

impl TaskGraph {
    pub fn builder() -> TaskGraphBuilder {
        TaskGraphBuilder::default()
    }

    /// Graph name as given in the input (`digraph "name" { ... }`).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// All task ids in graph task order.
    pub fn ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        (0..self.nodes.len() as u32).map(TaskId)
    }

    pub fn task_name(&self, id: TaskId) -> &str {
        &self.nodes[id.index()].name
    }

    pub fn weight(&self, id: TaskId) -> u64 {
        self.nodes[id.index()].weight
    }

    pub fn in_degree(&self, id: TaskId) -> usize {
        self.nodes[id.index()].preds.len()
    }

    /// Direct predecessors with the communication cost of each edge.
    pub fn predecessors(&self, id: TaskId) -> &[(TaskId, u64)] {
        &self.nodes[id.index()].preds
    }

    /// Direct successors with the communication cost of each edge.
    pub fn successors(&self, id: TaskId) -> &[(TaskId, u64)] {
        &self.nodes[id.index()].succs
    }

    pub fn comm_cost(&self, from: TaskId, to: TaskId) -> Option<u64> {
        self.nodes[from.index()]
            .succs
            .iter()
            .find(|(succ, _)| *succ == to)
            .map(|(_, cost)| *cost)
    }

    pub fn id_of(&self, name: &str) -> Option<TaskId> {
        self.by_name.get(name).copied()
    }

    pub fn bottom_level(&self, id: TaskId) -> u64 {
        self.nodes[id.index()].bottom_level
    }

    /// Weight of the heaviest path, ignoring communication costs.
    pub fn critical_path_length(&self) -> u64 {
        self.critical_path
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Every edge as `(from, to, comm_cost)`, grouped by source in task order.
    pub fn edges(&self) -> impl Iterator<Item = (TaskId, TaskId, u64)> + '_ {
        self.ids().flat_map(move |from| {
            self.successors(from)
                .iter()
                .map(move |&(to, cost)| (from, to, cost))
        })
    }
}

/// Incremental constructor for [`TaskGraph`].
///
/// Errors are deferred to [`TaskGraphBuilder::build`] so callers (the DOT
/// reader, test builders) can chain calls freely.
#[derive(Debug, Default)]
pub struct TaskGraphBuilder {
    name: String,
    tasks: Vec<(String, u64)>,
    edges: Vec<(String, String, u64)>,
}

impl TaskGraphBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn task(mut self, name: impl Into<String>, weight: u64) -> Self {
        self.tasks.push((name.into(), weight));
        self
    }

    pub fn edge(mut self, from: impl Into<String>, to: impl Into<String>, cost: u64) -> Self {
        self.edges.push((from.into(), to.into(), cost));
        self
    }

    pub fn build(self) -> Result<TaskGraph> {
        if self.tasks.is_empty() {
            return Err(DagschedError::InvalidGraph(
                "graph must contain at least one task".to_string(),
            ));
        }

        let mut by_name: HashMap<String, TaskId> = HashMap::with_capacity(self.tasks.len());
        let mut nodes: Vec<TaskNode> = Vec::with_capacity(self.tasks.len());

        for (name, weight) in self.tasks {
            let id = TaskId(nodes.len() as u32);
            if by_name.insert(name.clone(), id).is_some() {
                return Err(DagschedError::InvalidGraph(format!(
                    "task '{}' is declared more than once",
                    name
                )));
            }
            nodes.push(TaskNode {
                name,
                weight,
                preds: Vec::new(),
                succs: Vec::new(),
                bottom_level: 0,
            });
        }

        let edge_count = self.edges.len();
        for (from, to, cost) in self.edges {
            let lookup = |name: &str| {
                by_name.get(name).copied().ok_or_else(|| {
                    DagschedError::InvalidGraph(format!(
                        "edge '{}' -> '{}' references unknown task '{}'",
                        from, to, name
                    ))
                })
            };
            let src = lookup(&from)?;
            let dst = lookup(&to)?;

            if src == dst {
                return Err(DagschedError::InvalidGraph(format!(
                    "task '{}' cannot depend on itself",
                    from
                )));
            }
            if nodes[src.index()].succs.iter().any(|(s, _)| *s == dst) {
                return Err(DagschedError::InvalidGraph(format!(
                    "edge '{}' -> '{}' is declared more than once",
                    from, to
                )));
            }

            nodes[src.index()].succs.push((dst, cost));
            nodes[dst.index()].preds.push((src, cost));
        }

        let order = topological_order(&nodes)?;

        // Any start or finish time is at most total weight plus total
        // communication cost, so that sum must fit.
        let total_weight = checked_total(nodes.iter().map(|n| n.weight))?;
        let total_comm = checked_total(nodes.iter().flat_map(|n| n.succs.iter().map(|(_, c)| *c)))?;
        total_weight.checked_add(total_comm).ok_or_else(overflow)?;

        // Bottom levels, exits first.
        for &id in order.iter().rev() {
            let below = nodes[id.index()]
                .succs
                .iter()
                .map(|(succ, _)| nodes[succ.index()].bottom_level)
                .max()
                .unwrap_or(0);
            nodes[id.index()].bottom_level = nodes[id.index()].weight + below;
        }

        let critical_path = nodes.iter().map(|n| n.bottom_level).max().unwrap_or(0);

        Ok(TaskGraph {
            name: self.name,
            nodes,
            by_name,
            edge_count,
            total_weight,
            critical_path,
        })
    }
}

fn checked_total(mut values: impl Iterator<Item = u64>) -> Result<u64> {
    values
        .try_fold(0u64, |acc, v| acc.checked_add(v))
        .ok_or_else(overflow)
}

fn overflow() -> DagschedError {
    DagschedError::InvalidGraph(
        "weights overflow: total task weight plus communication cost exceeds u64".to_string(),
    )
}

/// Topological order of the tasks; fails with the name of a task on a cycle.
fn topological_order(nodes: &[TaskNode]) -> Result<Vec<TaskId>> {
    let mut graph: DiGraph<TaskId, ()> = DiGraph::with_capacity(nodes.len(), 0);
    for i in 0..nodes.len() {
        graph.add_node(TaskId(i as u32));
    }
    for (i, node) in nodes.iter().enumerate() {
        for (succ, _) in &node.succs {
            graph.add_edge(NodeIndex::new(i), NodeIndex::new(succ.index()), ());
        }
    }

    match toposort(&graph, None) {
        Ok(order) => Ok(order.into_iter().map(|ix| graph[ix]).collect()),
        Err(cycle) => {
            let id = graph[cycle.node_id()];
            Err(DagschedError::InvalidGraph(format!(
                "cycle detected in task graph involving task '{}'",
                nodes[id.index()].name
            )))
        }
    }
}
