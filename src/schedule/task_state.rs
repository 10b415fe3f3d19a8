// src/schedule/task_state.rs

/// Per-task record inside one partial schedule.
///
/// Values are immutable; a transition builds new ones with
/// [`TaskState::scheduled_on`] and [`TaskState::with_one_fewer_predecessor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskState {
    remaining_predecessors: i32,
    processor: u32,
    start_time: u64,
}

impl TaskState {
    /// Sentinel stored in `remaining_predecessors` once the task itself is scheduled.
    pub const SCHEDULED: i32 = -1;

    pub fn unscheduled(in_degree: usize) -> Self {
        Self {
            remaining_predecessors: in_degree as i32,
            processor: 0,
            start_time: 0,
        }
    }

    pub fn remaining_predecessors(&self) -> i32 {
        self.remaining_predecessors
    }

    /// Assigned processor. Only meaningful once [`is_scheduled`](Self::is_scheduled).
    pub fn processor(&self) -> usize {
        self.processor as usize
    }

    /// Assigned start time. Only meaningful once [`is_scheduled`](Self::is_scheduled).
    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    pub fn is_scheduled(&self) -> bool {
        self.remaining_predecessors == Self::SCHEDULED
    }

    /// All direct predecessors are scheduled but the task itself is not.
    pub fn is_available(&self) -> bool {
        self.remaining_predecessors == 0
    }

    pub fn scheduled_on(self, processor: usize, start_time: u64) -> Self {
        Self {
            remaining_predecessors: Self::SCHEDULED,
            processor: processor as u32,
            start_time,
        }
    }

    pub fn with_one_fewer_predecessor(self) -> Self {
        debug_assert!(self.remaining_predecessors > 0);
        Self {
            remaining_predecessors: self.remaining_predecessors - 1,
            ..self
        }
    }
}
