// src/schedule/mod.rs

//! Partial-schedule state and its transition function.
//!
//! - [`task_state`] is the per-task value (remaining predecessors, processor,
//!   start time).
//! - [`table`] stores one [`TaskState`] per task with structural sharing
//!   between parent and child schedules.
//! - [`partial`] is the immutable search-tree node and the transition that
//!   commits one task to one processor.
//! - [`bound`] holds the admissible lower bounds used as a node's cost.
//! - [`render`] turns a schedule into the textual outputs.

pub mod bound;
pub mod partial;
pub mod render;
pub mod table;
pub mod task_state;

pub use partial::{Assignment, PartialSchedule, StateKey};
pub use render::{render_dot, render_triples};
pub use table::StateTable;
pub use task_state::TaskState;
