// src/dag/scheduler.rs

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap};

use tracing::{debug, warn};

use crate::dag::scenario::{Scenario, TaskId};
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::task_state::{TaskState, TaskStates, TaskTimeline};
use crate::errors::{Result, SimError};
use crate::types::SimTime;

/// Rule deciding which eligible tasks may start running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Every eligible task starts the instant it becomes eligible.
    Unlimited,
    /// At most `n` tasks run at once. Eligible tasks wait for a free slot,
    /// earliest-eligible first, ties broken by ascending id.
    Capped(usize),
    /// Tasks of wave `k` start together once every task of waves `< k` in
    /// the same connected component has completed.
    Staged,
}

impl Admission {
    /// Capped admission; a cap of zero is clamped to one.
    pub fn capped(limit: usize) -> Self {
        Admission::Capped(limit.max(1))
    }

    /// Map an optional concurrency limit onto an admission rule.
    pub fn from_limit(limit: Option<usize>) -> Self {
        match limit {
            Some(n) => Admission::capped(n),
            None => Admission::Unlimited,
        }
    }
}

impl Default for Admission {
    fn default() -> Self {
        Admission::Unlimited
    }
}

/// Compute every task's state at `time`.
///
/// Pure function of `(scenario, time, limit)`: the whole schedule is derived
/// from scratch, so the same inputs always give the same mapping.
pub fn compute_states(scenario: &Scenario, time: SimTime, limit: Option<usize>) -> TaskStates {
    Schedule::build(scenario, Admission::from_limit(limit)).states_at(time)
}

/// Immutable per-task timeline of a scenario played under one admission
/// rule.
///
/// Building the schedule is a discrete-event pass over the DAG: at each
/// event time, running tasks whose end time has arrived complete, their
/// dependents become eligible, and eligible tasks are admitted according to
/// the [`Admission`] rule. Each task's completion time is fixed at admission.
///
/// Once built, any instant can be queried without further mutation, which is
/// what makes scrubbing and step-through deterministic.
#[derive(Debug, Clone)]
pub struct Schedule {
    admission: Admission,
    ids: Vec<TaskId>,
    index: HashMap<TaskId, usize>,
    timelines: Vec<TaskTimeline>,
    makespan: SimTime,
}

impl Schedule {
    pub fn build(scenario: &Scenario, admission: Admission) -> Self {
        let tasks = scenario.tasks();
        let graph = scenario.graph();
        let n = tasks.len();

        // Rank of each task by ascending id, used as the admission tie-break.
        let mut by_id: Vec<usize> = (0..n).collect();
        by_id.sort_by(|&a, &b| tasks[a].id.cmp(&tasks[b].id));
        let mut rank = vec![0usize; n];
        for (r, &i) in by_id.iter().enumerate() {
            rank[i] = r;
        }

        // Staged bookkeeping: unfinished tasks per (component, wave) and the
        // lowest wave still open in each component.
        let mut open_in_wave: Vec<Vec<usize>> = graph
            .waves_per_component()
            .into_iter()
            .map(|waves| vec![0usize; waves])
            .collect();
        for i in 0..n {
            open_in_wave[graph.component_of(i)][graph.wave_of(i)] += 1;
        }
        let mut current_wave = vec![0usize; graph.component_count()];

        let mut remaining_deps: Vec<usize> =
            (0..n).map(|i| graph.dependencies_of(i).len()).collect();
        let mut eligible_at: Vec<Option<SimTime>> = vec![None; n];
        let mut started_at: Vec<Option<SimTime>> = vec![None; n];
        let mut completed_at: Vec<Option<SimTime>> = vec![None; n];

        // (eligible_at, id rank, index)
        let mut ready: BTreeSet<(SimTime, usize, usize)> = BTreeSet::new();
        // (completion time, id rank, index)
        let mut running: BinaryHeap<Reverse<(SimTime, usize, usize)>> = BinaryHeap::new();

        for i in graph.roots() {
            eligible_at[i] = Some(0);
            ready.insert((0, rank[i], i));
        }

        let mut now: SimTime = 0;
        let mut completed = 0usize;

        loop {
            // 1. Retire everything that has finished by `now`.
            while let Some(&Reverse((end, _, i))) = running.peek() {
                if end > now {
                    break;
                }
                running.pop();
                completed_at[i] = Some(end);
                completed += 1;

                let c = graph.component_of(i);
                open_in_wave[c][graph.wave_of(i)] -= 1;
                while current_wave[c] < open_in_wave[c].len()
                    && open_in_wave[c][current_wave[c]] == 0
                {
                    current_wave[c] += 1;
                }

                for &d in graph.dependents_of(i) {
                    remaining_deps[d] -= 1;
                    if remaining_deps[d] == 0 {
                        eligible_at[d] = Some(now);
                        ready.insert((now, rank[d], d));
                    }
                }
            }

            if completed == n {
                break;
            }

            // 2. Admit eligible work.
            let admitted: Vec<(SimTime, usize, usize)> = match admission {
                Admission::Unlimited => ready.iter().copied().collect(),
                Admission::Capped(limit) => {
                    let free = limit.max(1).saturating_sub(running.len());
                    ready.iter().copied().take(free).collect()
                }
                Admission::Staged => ready
                    .iter()
                    .copied()
                    .filter(|&(_, _, i)| {
                        graph.wave_of(i) <= current_wave[graph.component_of(i)]
                    })
                    .collect(),
            };

            for entry in admitted {
                ready.remove(&entry);
                let (_, r, i) = entry;
                let end = now.saturating_add(tasks[i].duration);
                debug!(
                    task = %tasks[i].id,
                    start = now,
                    end,
                    "eligible task admitted; marking Running"
                );
                started_at[i] = Some(now);
                running.push(Reverse((end, r, i)));
            }

            // 3. Jump to the next completion.
            match running.peek() {
                Some(&Reverse((end, _, _))) => now = now.max(end),
                None => {
                    // Cannot happen for a validated DAG, but never spin.
                    warn!(
                        completed,
                        total = n,
                        "schedule stalled with no running tasks; stopping"
                    );
                    break;
                }
            }
        }

        let timelines: Vec<TaskTimeline> = (0..n)
            .map(|i| {
                let started = started_at[i].unwrap_or(SimTime::MAX);
                TaskTimeline {
                    eligible_at: eligible_at[i].unwrap_or(started),
                    started_at: started,
                    completed_at: completed_at[i].unwrap_or(SimTime::MAX),
                }
            })
            .collect();

        let makespan = timelines
            .iter()
            .map(|t| t.completed_at)
            .max()
            .unwrap_or(0);

        debug!(
            scenario = %scenario.name(),
            ?admission,
            makespan,
            "schedule built"
        );

        let ids: Vec<TaskId> = tasks.iter().map(|t| t.id.clone()).collect();
        let index = ids.iter().enumerate().map(|(i, id)| (id.clone(), i)).collect();

        Self {
            admission,
            ids,
            index,
            timelines,
            makespan,
        }
    }

    pub fn admission(&self) -> Admission {
        self.admission
    }

    /// Time at which the last task completes (0 for an empty scenario).
    pub fn makespan(&self) -> SimTime {
        self.makespan
    }

    /// Task ids in scenario order.
    pub fn task_ids(&self) -> &[TaskId] {
        &self.ids
    }

    pub fn timeline_of(&self, id: &str) -> Option<&TaskTimeline> {
        self.index.get(id).map(|&i| &self.timelines[i])
    }

    /// State of every task at `t`.
    pub fn states_at(&self, t: SimTime) -> TaskStates {
        let states: BTreeMap<TaskId, TaskState> = self
            .ids
            .iter()
            .zip(&self.timelines)
            .map(|(id, timeline)| (id.clone(), timeline.state_at(t)))
            .collect();
        TaskStates::from_map(states)
    }

    /// State of a single task at `t`.
    ///
    /// Asking about an id outside the scenario is a caller bug and is
    /// reported as [`SimError::InvalidTask`].
    pub fn state_of(&self, id: &str, t: SimTime) -> Result<TaskState> {
        self.timeline_of(id)
            .map(|timeline| timeline.state_at(t))
            .ok_or_else(|| SimError::InvalidTask(id.to_string()))
    }

    /// Order in which tasks were admitted, ties by ascending id.
    pub fn start_order(&self) -> Vec<&str> {
        let mut order: Vec<usize> = (0..self.ids.len()).collect();
        order.sort_by(|&a, &b| {
            self.timelines[a]
                .started_at
                .cmp(&self.timelines[b].started_at)
                .then_with(|| self.ids[a].cmp(&self.ids[b]))
        });
        order.into_iter().map(|i| self.ids[i].as_str()).collect()
    }

    /// Every state transition in time order.
    ///
    /// A transition that coincides with a later one for the same task (a
    /// root becoming eligible at 0 and starting at 0, say) is still listed,
    /// so a stepper sees each stage once.
    pub fn steps(&self) -> Vec<SchedulerStep> {
        let mut steps = Vec::with_capacity(self.ids.len() * 3);
        for (id, timeline) in self.ids.iter().zip(&self.timelines) {
            for (at, state) in [
                (timeline.eligible_at, TaskState::Eligible),
                (timeline.started_at, TaskState::Running),
                (timeline.completed_at, TaskState::Completed),
            ] {
                steps.push(SchedulerStep {
                    at,
                    task: id.clone(),
                    state,
                });
            }
        }
        steps.sort_by(|a, b| {
            a.at.cmp(&b.at)
                .then_with(|| a.state.cmp(&b.state))
                .then_with(|| a.task.cmp(&b.task))
        });
        steps
    }

    /// Earliest transition strictly after `t`, if any.
    pub fn next_event_after(&self, t: SimTime) -> Option<SimTime> {
        self.timelines
            .iter()
            .flat_map(|tl| [tl.eligible_at, tl.started_at, tl.completed_at])
            .filter(|&at| at > t)
            .min()
    }
}
