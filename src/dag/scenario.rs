// src/dag/scenario.rs

//! The immutable scenario value: tasks, their DAG, an optional chat
//! transcript and the coordination overhead declared for the staged strategy.

use tracing::debug;

use crate::dag::graph::DagGraph;
use crate::errors::ScenarioError;
use crate::types::{ChatRole, SimTime};

/// Canonical task id type used throughout the engine.
pub type TaskId = String;

/// One unit of synthetic work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    /// Display label; opaque to the engine.
    pub label: Option<String>,
    /// Ids of tasks that must complete before this one may start.
    pub deps: Vec<TaskId>,
    /// Simulated time units needed once started.
    pub duration: SimTime,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, duration: SimTime) -> Self {
        Self {
            id: id.into(),
            label: None,
            deps: Vec::new(),
            duration,
            input_tokens: 0,
            output_tokens: 0,
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// A single turn of the conversational view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
    /// Offset from the start of playback at which the turn appears.
    pub at: SimTime,
    /// Estimated token count of `text`.
    pub tokens: u64,
}

/// Extra tokens an orchestrator spends per wave under the staged strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinationOverhead {
    pub staged_input_tokens_per_wave: u64,
    pub staged_output_tokens_per_wave: u64,
}

/// Longest dependency chain by cumulative duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticalPath {
    pub tasks: Vec<TaskId>,
    pub length: SimTime,
}

/// Immutable, validated scenario.
///
/// Constructed once (from a scenario file or programmatically) and then
/// only read. Everything the scheduler and cost model produce is derived
/// from it on demand.
#[derive(Debug, Clone)]
pub struct Scenario {
    name: String,
    description: Option<String>,
    tasks: Vec<Task>,
    graph: DagGraph,
    transcript: Vec<ChatTurn>,
    overhead: CoordinationOverhead,
}

impl Scenario {
    /// Validate `tasks` and build a scenario from them.
    ///
    /// Task order is preserved; it is the order used for display and for
    /// every index-based table the engine derives.
    pub fn new(name: impl Into<String>, tasks: Vec<Task>) -> Result<Self, ScenarioError> {
        let graph = DagGraph::build(&tasks)?;
        let name = name.into();
        debug!(scenario = %name, tasks = tasks.len(), "scenario built");

        Ok(Self {
            name,
            description: None,
            tasks,
            graph,
            transcript: Vec::new(),
            overhead: CoordinationOverhead::default(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a chat transcript. Turns are kept ordered by offset; turns
    /// sharing an offset keep their relative order.
    pub fn with_transcript(mut self, mut transcript: Vec<ChatTurn>) -> Self {
        transcript.sort_by_key(|turn| turn.at);
        self.transcript = transcript;
        self
    }

    pub fn with_overhead(mut self, overhead: CoordinationOverhead) -> Self {
        self.overhead = overhead;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.graph.index_of(id).map(|i| &self.tasks[i])
    }

    pub fn graph(&self) -> &DagGraph {
        &self.graph
    }

    pub fn overhead(&self) -> CoordinationOverhead {
        self.overhead
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    /// Chat turns that have appeared by simulated time `t`.
    pub fn visible_transcript(&self, t: SimTime) -> &[ChatTurn] {
        let end = self.transcript.partition_point(|turn| turn.at <= t);
        &self.transcript[..end]
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Sum of all task durations, saturating at `SimTime::MAX`.
    pub fn total_duration(&self) -> SimTime {
        self.tasks
            .iter()
            .fold(0, |acc: SimTime, t| acc.saturating_add(t.duration))
    }

    /// Longest path from any root to any leaf, by cumulative duration.
    ///
    /// Ties between equally long chains go to the one ending at the
    /// earliest-declared task.
    pub fn critical_path(&self) -> CriticalPath {
        let n = self.tasks.len();
        let mut finish = vec![0 as SimTime; n];
        let mut via: Vec<Option<usize>> = vec![None; n];

        for &i in self.graph.topological_order() {
            let mut best: Option<usize> = None;
            for &d in self.graph.dependencies_of(i) {
                if best.is_none_or(|b| finish[d] > finish[b]) {
                    best = Some(d);
                }
            }
            finish[i] = self.tasks[i]
                .duration
                .saturating_add(best.map(|b| finish[b]).unwrap_or(0));
            via[i] = best;
        }

        let mut end: Option<usize> = None;
        for i in 0..n {
            if end.is_none_or(|e| finish[i] > finish[e]) {
                end = Some(i);
            }
        }

        let mut chain = Vec::new();
        let mut cursor = end;
        while let Some(i) = cursor {
            chain.push(self.tasks[i].id.clone());
            cursor = via[i];
        }
        chain.reverse();

        CriticalPath {
            tasks: chain,
            length: end.map(|e| finish[e]).unwrap_or(0),
        }
    }
}
