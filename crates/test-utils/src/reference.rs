//! Slow, obviously-correct helpers the search is checked against.

use dagsched::graph::{TaskGraph, TaskId};
use dagsched::schedule::Assignment;

/// Minimum makespan by exhaustive enumeration.
///
/// Tries every ready task on every processor and places it in the earliest
/// idle gap that fits (not just after the processor's last task), so it
/// covers schedules the append-only search never builds directly. Only
/// usable for a handful of tasks.
pub fn optimal_makespan(graph: &TaskGraph, processors: usize) -> u64 {
    let mut b = Brute {
        graph,
        slots: vec![Vec::new(); processors],
        placed: vec![None; graph.len()],
        waiting: graph.ids().map(|id| graph.in_degree(id)).collect(),
        best: u64::MAX,
    };
    b.recurse(0, 0);
    b.best
}

struct Brute<'g> {
    graph: &'g TaskGraph,
    /// Busy intervals per processor, sorted by start.
    slots: Vec<Vec<(u64, u64)>>,
    placed: Vec<Option<(usize, u64)>>,
    waiting: Vec<usize>,
    best: u64,
}

impl Brute<'_> {
    fn recurse(&mut self, count: usize, makespan: u64) {
        if makespan >= self.best {
            return;
        }
        if count == self.graph.len() {
            self.best = makespan;
            return;
        }

        let ready: Vec<TaskId> = self
            .graph
            .ids()
            .filter(|id| self.placed[id.index()].is_none() && self.waiting[id.index()] == 0)
            .collect();

        for task in ready {
            let w = self.graph.weight(task);
            for p in 0..self.slots.len() {
                let data_ready = self
                    .graph
                    .predecessors(task)
                    .iter()
                    .map(|&(pred, comm)| {
                        let (pp, ps) = self.placed[pred.index()].expect("predecessor placed");
                        let finish = ps + self.graph.weight(pred);
                        if pp == p { finish } else { finish + comm }
                    })
                    .max()
                    .unwrap_or(0);
                let start = earliest_gap(&self.slots[p], data_ready, w);

                let pos = self.slots[p].partition_point(|&(s, _)| s <= start);
                self.slots[p].insert(pos, (start, start + w));
                self.placed[task.index()] = Some((p, start));
                for &(succ, _) in self.graph.successors(task) {
                    self.waiting[succ.index()] -= 1;
                }

                self.recurse(count + 1, makespan.max(start + w));

                for &(succ, _) in self.graph.successors(task) {
                    self.waiting[succ.index()] += 1;
                }
                self.placed[task.index()] = None;
                self.slots[p].remove(pos);
            }
        }
    }
}

fn earliest_gap(busy: &[(u64, u64)], not_before: u64, len: u64) -> u64 {
    let mut t = not_before;
    for &(s, e) in busy {
        if t + len <= s {
            return t;
        }
        t = t.max(e);
    }
    t
}

/// Check that `assignments` is a complete, feasible schedule of `graph` on
/// `processors` processors. Returns the makespan.
pub fn check_schedule(
    graph: &TaskGraph,
    processors: usize,
    assignments: &[Assignment],
) -> Result<u64, String> {
    let mut placed: Vec<Option<(usize, u64)>> = vec![None; graph.len()];
    for a in assignments {
        if a.processor >= processors {
            return Err(format!("{} on processor {} of {processors}", a.task, a.processor));
        }
        if placed[a.task.index()].replace((a.processor, a.start)).is_some() {
            return Err(format!("{} scheduled twice", a.task));
        }
    }

    let mut makespan = 0;
    for id in graph.ids() {
        let (p, start) = placed[id.index()].ok_or_else(|| format!("{id} never scheduled"))?;
        makespan = makespan.max(start + graph.weight(id));

        for &(pred, comm) in graph.predecessors(id) {
            let (pp, ps) = placed[pred.index()].ok_or_else(|| format!("{pred} never scheduled"))?;
            let arrival = ps + graph.weight(pred) + if pp == p { 0 } else { comm };
            if start < arrival {
                return Err(format!("{id} starts at {start} before {pred} data arrives at {arrival}"));
            }
        }
    }

    for p in 0..processors {
        let mut spans: Vec<(u64, u64)> = graph
            .ids()
            .filter_map(|id| {
                let (pp, s) = placed[id.index()]?;
                (pp == p && graph.weight(id) > 0).then(|| (s, s + graph.weight(id)))
            })
            .collect();
        spans.sort_unstable();
        for pair in spans.windows(2) {
            if pair[1].0 < pair[0].1 {
                return Err(format!("overlap on processor {p}: {:?} and {:?}", pair[0], pair[1]));
            }
        }
    }

    Ok(makespan)
}
