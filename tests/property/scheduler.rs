// tests/property/scheduler.rs

use std::collections::HashSet;
use std::ops::Range;

use dagsim::cost::latency;
use dagsim::dag::{compute_states, Admission, Schedule, Scenario, TaskState};
use dagsim::types::Strategy as ExecStrategy;
use proptest::prelude::*;

use crate::common::{ScenarioBuilder, TaskBuilder};

fn scenario_strategy(max_tasks: usize) -> impl Strategy<Value = Scenario> {
    raw_tasks(max_tasks, 0..8).prop_map(|raw| build_scenario(raw, None))
}

// Every task takes time and `side` shares no edges with the rest, so the
// graph always has at least two components.
fn branching_scenario_strategy(max_tasks: usize) -> impl Strategy<Value = Scenario> {
    (raw_tasks(max_tasks, 1..8), 1u64..8).prop_map(|(raw, side)| build_scenario(raw, Some(side)))
}

fn raw_tasks(
    max_tasks: usize,
    durations: Range<u64>,
) -> impl Strategy<Value = Vec<(u64, Vec<usize>)>> {
    (1..=max_tasks).prop_flat_map(move |num_tasks| {
        proptest::collection::vec(
            (
                durations.clone(),
                proptest::collection::vec(any::<usize>(), 0..num_tasks),
            ),
            num_tasks,
        )
    })
}

// Acyclic by construction: task N may only depend on tasks 0..N-1.
fn build_scenario(raw: Vec<(u64, Vec<usize>)>, side: Option<u64>) -> Scenario {
    let mut builder = ScenarioBuilder::new("generated");
    for (i, (duration, potential_deps)) in raw.into_iter().enumerate() {
        let mut task = TaskBuilder::new(&format!("task_{i:02}"), duration);
        let deps: HashSet<usize> = if i == 0 {
            HashSet::new()
        } else {
            potential_deps.into_iter().map(|d| d % i).collect()
        };
        for d in deps {
            task = task.after(&format!("task_{d:02}"));
        }
        builder = builder.with_task(task);
    }
    if let Some(duration) = side {
        builder = builder.with_task(TaskBuilder::new("side", duration));
    }
    builder.build()
}

fn admission_strategy() -> impl Strategy<Value = Admission> {
    prop_oneof![
        Just(Admission::Unlimited),
        Just(Admission::Staged),
        (1usize..4).prop_map(Admission::Capped),
    ]
}

proptest! {
    #[test]
    fn states_never_move_backwards(
        scenario in scenario_strategy(10),
        admission in admission_strategy(),
    ) {
        let schedule = Schedule::build(&scenario, admission);
        let mut previous = schedule.states_at(0);
        for t in 1..=schedule.makespan() + 1 {
            let current = schedule.states_at(t);
            for (id, state) in current.iter() {
                prop_assert!(previous.get(id).unwrap() <= state);
            }
            previous = current;
        }
        prop_assert!(schedule.states_at(schedule.makespan()).all_completed());
    }

    #[test]
    fn compute_states_is_deterministic(
        scenario in scenario_strategy(10),
        t in 0u64..60,
        limit in proptest::option::of(1usize..4),
    ) {
        prop_assert_eq!(
            compute_states(&scenario, t, limit),
            compute_states(&scenario, t, limit)
        );
    }

    #[test]
    fn tasks_start_only_after_their_dependencies(
        scenario in scenario_strategy(10),
        admission in admission_strategy(),
    ) {
        let schedule = Schedule::build(&scenario, admission);
        for task in scenario.tasks() {
            let timeline = schedule.timeline_of(&task.id).unwrap();
            prop_assert!(timeline.eligible_at <= timeline.started_at);
            prop_assert_eq!(timeline.completed_at, timeline.started_at + task.duration);
            for dep in &task.deps {
                let dep_done = schedule.timeline_of(dep).unwrap().completed_at;
                prop_assert!(dep_done <= timeline.eligible_at);
            }
        }
    }

    #[test]
    fn capped_admission_respects_the_limit(
        scenario in scenario_strategy(10),
        limit in 1usize..4,
    ) {
        let schedule = Schedule::build(&scenario, Admission::capped(limit));
        for t in 0..=schedule.makespan() {
            prop_assert!(schedule.states_at(t).count(TaskState::Running) <= limit);
        }
    }

    #[test]
    fn strategy_latencies_are_ordered_and_match_playback(
        scenario in scenario_strategy(12),
    ) {
        let seq = latency(&scenario, ExecStrategy::Sequential);
        let par = latency(&scenario, ExecStrategy::Parallel);
        let staged = latency(&scenario, ExecStrategy::Staged);

        prop_assert!(par <= staged);
        prop_assert!(staged <= seq);
        prop_assert_eq!(seq, scenario.total_duration());

        for strategy in ExecStrategy::ALL {
            prop_assert_eq!(
                Schedule::build(&scenario, strategy.admission()).makespan(),
                latency(&scenario, strategy)
            );
        }
    }

    #[test]
    fn parallel_beats_sequential_when_work_can_overlap(
        scenario in branching_scenario_strategy(10),
    ) {
        let seq = latency(&scenario, ExecStrategy::Sequential);
        let par = latency(&scenario, ExecStrategy::Parallel);
        prop_assert!(par < seq, "parallel {} vs sequential {}", par, seq);
    }
}
