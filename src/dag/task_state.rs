// src/dag/task_state.rs

//! Derived task states and the per-task timeline they are read from.

use std::collections::BTreeMap;
use std::fmt;

use crate::dag::scenario::TaskId;
use crate::types::SimTime;

/// State of a task at a given simulated time.
///
/// Ordered by progress: a task only ever moves to a later variant as time
/// advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskState {
    /// Waiting on at least one dependency.
    Pending,
    /// All dependencies completed; waiting for admission.
    Eligible,
    Running,
    Completed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Completed)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Pending => "pending",
            TaskState::Eligible => "eligible",
            TaskState::Running => "running",
            TaskState::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// When a task became eligible, was admitted, and completed.
///
/// Fixed once computed: `completed_at = started_at + duration` and
/// `eligible_at <= started_at <= completed_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTimeline {
    pub eligible_at: SimTime,
    pub started_at: SimTime,
    pub completed_at: SimTime,
}

impl TaskTimeline {
    pub fn state_at(&self, t: SimTime) -> TaskState {
        if t >= self.completed_at {
            TaskState::Completed
        } else if t >= self.started_at {
            TaskState::Running
        } else if t >= self.eligible_at {
            TaskState::Eligible
        } else {
            TaskState::Pending
        }
    }
}

/// Snapshot of every task's state at one instant, keyed by task id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStates {
    states: BTreeMap<TaskId, TaskState>,
}

impl TaskStates {
    pub(crate) fn from_map(states: BTreeMap<TaskId, TaskState>) -> Self {
        Self { states }
    }

    /// State of `id`, or `None` for ids outside the scenario.
    pub fn get(&self, id: &str) -> Option<TaskState> {
        self.states.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TaskState)> {
        self.states.iter().map(|(id, s)| (id.as_str(), *s))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of tasks currently in `state`.
    pub fn count(&self, state: TaskState) -> usize {
        self.states.values().filter(|s| **s == state).count()
    }

    /// Ids of tasks currently in `state`, ascending.
    pub fn ids_in(&self, state: TaskState) -> Vec<&str> {
        self.iter()
            .filter(|(_, s)| *s == state)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn all_completed(&self) -> bool {
        self.states.values().all(|s| s.is_terminal())
    }
}
