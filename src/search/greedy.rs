// src/search/greedy.rs

//! Quick complete schedule used to seed the incumbent.

use crate::errors::{DagschedError, Result};
use crate::graph::TaskGraph;
use crate::schedule::PartialSchedule;

/// List-schedule from `root`: repeatedly commit the available task with the
/// largest bottom level (ties: graph order) to the processor where it can
/// start earliest (ties: lowest index).
pub fn list_schedule(graph: &TaskGraph, root: &PartialSchedule) -> Result<PartialSchedule> {
    let mut current = root.clone();

    while !current.is_complete() {
        let available = current.available_tasks();
        let Some(&task) = available
            .iter()
            .max_by(|a, b| {
                graph
                    .bottom_level(**a)
                    .cmp(&graph.bottom_level(**b))
                    .then_with(|| b.cmp(a))
            })
        else {
            // TaskGraph construction rules out cycles; an empty set here is a bug.
            return Err(DagschedError::InvalidGraph(
                "no available task while unscheduled tasks remain".to_string(),
            ));
        };

        let processor = (0..current.processors())
            .min_by_key(|&p| (current.earliest_start(graph, task, p), p))
            .unwrap_or(0);

        current = PartialSchedule::child(&current, graph, task, processor)?;
    }

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn independent_tasks_spread_across_processors() {
        let g = TaskGraph::builder()
            .task("a", 3)
            .task("b", 4)
            .build()
            .unwrap();
        let root = PartialSchedule::root(&g, 2).unwrap();
        let s = list_schedule(&g, &root).unwrap();
        assert!(s.is_complete());
        assert_eq!(s.makespan(), 4);
        // b has the larger bottom level and goes first.
        assert_eq!(s.path()[0], g.id_of("b").unwrap());
    }

    #[test]
    fn heavy_edge_stays_on_one_processor() {
        let g = TaskGraph::builder()
            .task("a", 3)
            .task("b", 2)
            .edge("a", "b", 4)
            .build()
            .unwrap();
        let root = PartialSchedule::root(&g, 2).unwrap();
        let s = list_schedule(&g, &root).unwrap();
        assert_eq!(s.makespan(), 5);
    }
}
