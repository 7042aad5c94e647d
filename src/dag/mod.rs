// src/dag/mod.rs

//! Scenario model and scheduling.
//!
//! - [`scenario`] holds the immutable task/transcript bundle.
//! - [`graph`] validates the dependency DAG and precomputes its structure
//!   (topological order, waves, connected components).
//! - [`scheduler`] turns a scenario plus an admission rule into a fixed
//!   per-task timeline, from which states at any instant are read.
//! - [`task_state`] provides the derived state types.
//! - [`scheduler_step`] defines the transition records used for stepping.

pub mod graph;
pub mod scenario;
pub mod scheduler;
pub mod scheduler_step;
pub mod task_state;

pub use graph::DagGraph;
pub use scenario::{ChatTurn, CoordinationOverhead, CriticalPath, Scenario, Task, TaskId};
pub use scheduler::{compute_states, Admission, Schedule};
pub use scheduler_step::SchedulerStep;
pub use task_state::{TaskState, TaskStates, TaskTimeline};
