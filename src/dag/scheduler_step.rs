// src/dag/scheduler_step.rs

//! Discrete transitions of a computed schedule.

use crate::dag::scenario::TaskId;
use crate::dag::task_state::TaskState;
use crate::types::SimTime;

/// A single state transition in a schedule.
///
/// Useful for stepping a visualization from one event to the next and for
/// tests that want to assert on ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerStep {
    /// Simulated time at which the transition happens.
    pub at: SimTime,
    pub task: TaskId,
    /// State the task enters at `at`.
    pub state: TaskState,
}
