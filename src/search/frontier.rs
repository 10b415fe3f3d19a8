// src/search/frontier.rs

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::schedule::PartialSchedule;
use crate::types::Traversal;

/// Open nodes of the search tree.
#[derive(Debug)]
pub enum Frontier {
    /// LIFO: children are pushed worst-first so the cheapest is popped next.
    Stack(Vec<PartialSchedule>),
    /// Lowest cost first; ties go to the deeper node, then to the older one.
    Heap {
        heap: BinaryHeap<Reverse<Ranked>>,
        next_seq: u64,
    },
}

/// Heap entry ordered by `(cost, Reverse(depth), seq)`.
#[derive(Debug)]
pub struct Ranked {
    cost: u64,
    depth: usize,
    seq: u64,
    schedule: PartialSchedule,
}

impl Ranked {
    fn key(&self) -> (u64, Reverse<usize>, u64) {
        (self.cost, Reverse(self.depth), self.seq)
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Frontier {
    pub fn new(traversal: Traversal) -> Self {
        match traversal {
            Traversal::DepthFirst => Frontier::Stack(Vec::new()),
            Traversal::BestFirst => Frontier::Heap {
                heap: BinaryHeap::new(),
                next_seq: 0,
            },
        }
    }

    pub fn push(&mut self, schedule: PartialSchedule) {
        match self {
            Frontier::Stack(stack) => stack.push(schedule),
            Frontier::Heap { heap, next_seq } => {
                let seq = *next_seq;
                *next_seq += 1;
                heap.push(Reverse(Ranked {
                    cost: schedule.cost(),
                    depth: schedule.scheduled_count(),
                    seq,
                    schedule,
                }));
            }
        }
    }

    /// Push the children of one expansion.
    ///
    /// For the stack they go in by descending cost so the cheapest child is
    /// explored first; the heap orders them itself.
    pub fn push_children(&mut self, mut children: Vec<PartialSchedule>) {
        if let Frontier::Stack(_) = self {
            children.sort_by_key(|c| Reverse(c.cost()));
        }
        for child in children {
            self.push(child);
        }
    }

    pub fn pop(&mut self) -> Option<PartialSchedule> {
        match self {
            Frontier::Stack(stack) => stack.pop(),
            Frontier::Heap { heap, .. } => heap.pop().map(|Reverse(r)| r.schedule),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Frontier::Stack(stack) => stack.len(),
            Frontier::Heap { heap, .. } => heap.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TaskGraph;

    fn children() -> (TaskGraph, Vec<PartialSchedule>) {
        let g = TaskGraph::builder()
            .task("a", 1)
            .task("b", 5)
            .task("c", 3)
            .build()
            .unwrap();
        let root = PartialSchedule::root(&g, 3).unwrap();
        let kids = g
            .ids()
            .map(|id| PartialSchedule::child(&root, &g, id, 0).unwrap())
            .collect();
        (g, kids)
    }

    #[test]
    fn stack_pops_cheapest_child_first() {
        let (_g, kids) = children();
        let costs: Vec<u64> = kids.iter().map(|k| k.cost()).collect();
        let mut f = Frontier::new(Traversal::DepthFirst);
        f.push_children(kids);
        let first = f.pop().unwrap();
        assert_eq!(first.cost(), *costs.iter().min().unwrap());
        assert_eq!(f.len(), 2);
    }

    #[test]
    fn heap_pops_in_cost_order() {
        let (_g, kids) = children();
        let mut f = Frontier::new(Traversal::BestFirst);
        f.push_children(kids);
        let mut popped = Vec::new();
        while let Some(s) = f.pop() {
            popped.push(s.cost());
        }
        let mut sorted = popped.clone();
        sorted.sort();
        assert_eq!(popped, sorted);
        assert!(f.is_empty());
    }
}
