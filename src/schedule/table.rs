// src/schedule/table.rs

use std::sync::Arc;

use crate::schedule::task_state::TaskState;

const CHUNK: usize = 32;

/// Persistent array of [`TaskState`], indexed by dense task id.
///
/// Two levels: a vector of `Arc`'d fixed-size chunks. Cloning copies only the
/// chunk pointers; [`set`](Self::set) copies only the chunk it writes to, so a
/// child schedule shares every untouched chunk with its parent and siblings.
#[derive(Debug, Clone)]
pub struct StateTable {
    chunks: Vec<Arc<Vec<TaskState>>>,
    len: usize,
}

impl StateTable {
    pub fn from_states(states: impl IntoIterator<Item = TaskState>) -> Self {
        let mut chunks = Vec::new();
        let mut current = Vec::with_capacity(CHUNK);
        let mut len = 0;

        for state in states {
            current.push(state);
            len += 1;
            if current.len() == CHUNK {
                chunks.push(Arc::new(std::mem::replace(
                    &mut current,
                    Vec::with_capacity(CHUNK),
                )));
            }
        }
        if !current.is_empty() {
            chunks.push(Arc::new(current));
        }

        Self { chunks, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get(&self, index: usize) -> TaskState {
        self.chunks[index / CHUNK][index % CHUNK]
    }

    pub fn set(&mut self, index: usize, state: TaskState) {
        Arc::make_mut(&mut self.chunks[index / CHUNK])[index % CHUNK] = state;
    }

    pub fn iter(&self) -> impl Iterator<Item = TaskState> + '_ {
        self.chunks.iter().flat_map(|chunk| chunk.iter().copied())
    }

    /// Whether `other` still points at the same storage for `index`'s chunk.
    pub fn shares_chunk_with(&self, other: &StateTable, index: usize) -> bool {
        Arc::ptr_eq(&self.chunks[index / CHUNK], &other.chunks[index / CHUNK])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_copies_only_touched_chunk() {
        let parent = StateTable::from_states((0..100).map(|_| TaskState::unscheduled(1)));
        assert_eq!(parent.len(), 100);

        let mut child = parent.clone();
        child.set(70, TaskState::unscheduled(0));

        assert!(child.get(70).is_available());
        assert!(!parent.get(70).is_available());
        assert!(child.shares_chunk_with(&parent, 0));
        assert!(child.shares_chunk_with(&parent, 40));
        assert!(!child.shares_chunk_with(&parent, 70));
        assert_eq!(child.iter().filter(|s| s.is_available()).count(), 1);
    }
}
