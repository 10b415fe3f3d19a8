#![allow(dead_code)]

use std::collections::BTreeSet;

use dagsched::graph::{TaskGraph, TaskGraphBuilder};
use proptest::prelude::*;

/// Shorthand for graphs written inline in tests.
///
/// ```ignore
/// let g = GraphBuilder::new()
///     .tasks(&[("a", 2), ("b", 3)])
///     .edges(&[("a", "b", 1)])
///     .build();
/// ```
pub struct GraphBuilder {
    inner: TaskGraphBuilder,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            inner: TaskGraph::builder(),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.inner = self.inner.name(name);
        self
    }

    pub fn tasks(mut self, tasks: &[(&str, u64)]) -> Self {
        for &(name, weight) in tasks {
            self.inner = self.inner.task(name, weight);
        }
        self
    }

    pub fn edges(mut self, edges: &[(&str, &str, u64)]) -> Self {
        for &(from, to, cost) in edges {
            self.inner = self.inner.edge(from, to, cost);
        }
        self
    }

    pub fn build(self) -> TaskGraph {
        self.inner.build().expect("Failed to build valid graph from builder")
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `a -> {b, c} -> d` with weights 2/3/3/2 and communication cost 1 on every edge.
pub fn fork_join() -> TaskGraph {
    GraphBuilder::new()
        .named("fork_join")
        .tasks(&[("a", 2), ("b", 3), ("c", 3), ("d", 2)])
        .edges(&[("a", "b", 1), ("a", "c", 1), ("b", "d", 1), ("c", "d", 1)])
        .build()
}

/// `n` independent tasks with the given weights, named `t0..`.
pub fn independent(weights: &[u64]) -> TaskGraph {
    let tasks: Vec<(String, u64)> = weights
        .iter()
        .enumerate()
        .map(|(i, &w)| (format!("t{i}"), w))
        .collect();
    let mut b = TaskGraph::builder().name("independent");
    for (name, w) in tasks {
        b = b.task(name, w);
    }
    b.build().expect("independent tasks form a valid graph")
}

/// Random DAG with up to `max_tasks` tasks.
///
/// Acyclic by construction: task `i` may only depend on tasks `0..i`.
/// Zero weights are included for tasks and edges alike.
pub fn dag_strategy(
    max_tasks: usize,
    max_weight: u64,
    max_comm: u64,
) -> impl Strategy<Value = TaskGraph> {
    (1..=max_tasks).prop_flat_map(move |n| {
        let weights = proptest::collection::vec(0..=max_weight, n);
        let deps = proptest::collection::vec(
            proptest::collection::vec((any::<usize>(), 0..=max_comm), 0..n.max(1)),
            n,
        );
        (weights, deps).prop_map(move |(weights, deps)| {
            let mut b = TaskGraph::builder().name("random");
            for (i, w) in weights.iter().enumerate() {
                b = b.task(format!("n{i}"), *w);
            }
            for (i, potential) in deps.into_iter().enumerate() {
                if i == 0 {
                    continue;
                }
                let mut seen = BTreeSet::new();
                for (dep, cost) in potential {
                    let dep = dep % i;
                    if seen.insert(dep) {
                        b = b.edge(format!("n{dep}"), format!("n{i}"), cost);
                    }
                }
            }
            b.build().expect("generated graph is acyclic")
        })
    })
}
