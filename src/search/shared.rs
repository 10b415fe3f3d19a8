// src/search/shared.rs

//! State shared between search workers: the incumbent and cancellation.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::schedule::PartialSchedule;

/// Lock a mutex, recovering the guard if another worker panicked while
/// holding it. Everything guarded here stays consistent between statements.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Best complete schedule found so far.
///
/// The cost lives in an atomic so workers can prune without taking a lock;
/// it only ever decreases.
#[derive(Debug)]
pub struct Incumbent {
    cost: AtomicU64,
    schedule: Mutex<Option<PartialSchedule>>,
}

impl Incumbent {
    pub fn new() -> Self {
        Self {
            cost: AtomicU64::new(u64::MAX),
            schedule: Mutex::new(None),
        }
    }

    /// Current best cost (`u64::MAX` until the first complete schedule).
    pub fn cost(&self) -> u64 {
        self.cost.load(Ordering::Acquire)
    }

    /// Offer a complete schedule. Returns `true` if it became the incumbent.
    pub fn offer(&self, schedule: PartialSchedule) -> bool {
        let cost = schedule.cost();
        let mut current = self.cost.load(Ordering::Acquire);
        loop {
            if cost >= current {
                return false;
            }
            match self
                .cost
                .compare_exchange_weak(current, cost, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }

        // A cheaper offer may have won the race between the CAS and this lock.
        let mut slot = lock(&self.schedule);
        match slot.as_ref() {
            Some(existing) if existing.cost() <= cost => {}
            _ => *slot = Some(schedule),
        }
        true
    }

    pub fn schedule(&self) -> Option<PartialSchedule> {
        lock(&self.schedule).clone()
    }

    pub fn into_schedule(self) -> Option<PartialSchedule> {
        self.schedule
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Incumbent {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle that stops a running search.
///
/// The search finishes its current expansions and reports the best schedule
/// found so far, flagged as possibly non-optimal.
#[derive(Debug, Clone, Default)]
pub struct SearchHandle {
    cancelled: Arc<AtomicBool>,
}

impl SearchHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TaskGraph;

    fn complete(g: &TaskGraph, processors: usize) -> PartialSchedule {
        let mut s = PartialSchedule::root(g, processors).unwrap();
        while !s.is_complete() {
            let t = s.available_tasks()[0];
            s = PartialSchedule::child(&s, g, t, 0).unwrap();
        }
        s
    }

    #[test]
    fn incumbent_only_accepts_improvements() {
        let g = TaskGraph::builder().task("a", 3).task("b", 4).build().unwrap();
        let serial = complete(&g, 1);
        assert_eq!(serial.cost(), 7);

        let inc = Incumbent::new();
        assert_eq!(inc.cost(), u64::MAX);
        assert!(inc.offer(serial.clone()));
        assert_eq!(inc.cost(), 7);
        assert!(!inc.offer(serial));

        let root = PartialSchedule::root(&g, 2).unwrap();
        let s = PartialSchedule::child(&root, &g, g.id_of("a").unwrap(), 0).unwrap();
        let s = PartialSchedule::child(&s, &g, g.id_of("b").unwrap(), 1).unwrap();
        assert!(inc.offer(s));
        assert_eq!(inc.cost(), 4);
        assert_eq!(inc.into_schedule().map(|s| s.cost()), Some(4));
    }

    #[test]
    fn concurrent_offers_keep_the_minimum() {
        let g = TaskGraph::builder().task("a", 3).task("b", 4).build().unwrap();
        let serial = complete(&g, 1);
        let root = PartialSchedule::root(&g, 2).unwrap();
        let s = PartialSchedule::child(&root, &g, g.id_of("a").unwrap(), 0).unwrap();
        let parallel = PartialSchedule::child(&s, &g, g.id_of("b").unwrap(), 1).unwrap();

        let inc = Incumbent::new();
        std::thread::scope(|scope| {
            for i in 0..8 {
                let offer = if i % 2 == 0 { serial.clone() } else { parallel.clone() };
                let inc = &inc;
                scope.spawn(move || inc.offer(offer));
            }
        });
        assert_eq!(inc.cost(), 4);
        assert_eq!(inc.schedule().map(|s| s.cost()), Some(4));
    }

    #[test]
    fn handle_clones_share_the_flag() {
        let h = SearchHandle::new();
        let h2 = h.clone();
        assert!(!h.is_cancelled());
        h2.cancel();
        assert!(h.is_cancelled());
    }
}
