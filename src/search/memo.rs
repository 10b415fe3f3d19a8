// src/search/memo.rs

use std::sync::Mutex;

use rustc_hash::FxHashSet;

use crate::schedule::StateKey;
use crate::search::shared::lock;

/// Set of partial-schedule content keys already placed on the frontier.
///
/// Once `capacity` keys are stored, new keys are no longer recorded (so
/// memory stays bounded) but lookups keep answering for the recorded ones.
#[derive(Debug)]
pub struct VisitedSet {
    keys: Mutex<FxHashSet<StateKey>>,
    capacity: usize,
}

impl VisitedSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            keys: Mutex::new(FxHashSet::default()),
            capacity,
        }
    }

    /// Returns `false` if `key` was seen before (the state is a duplicate).
    pub fn insert(&self, key: StateKey) -> bool {
        let mut keys = lock(&self.keys);
        if keys.contains(&key) {
            return false;
        }
        if keys.len() < self.capacity {
            keys.insert(key);
        }
        true
    }

    pub fn len(&self) -> usize {
        lock(&self.keys).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }
}
