// src/graph/mod.rs

//! Task graph representation and loading.
//!
//! - [`task_graph`] holds the immutable, densely indexed DAG the search runs on.
//! - [`dot`] reads a task graph from a DOT description.

pub mod dot;
pub mod task_graph;

pub use dot::{load_dot, parse_dot};
pub use task_graph::{TaskGraph, TaskGraphBuilder, TaskId};
