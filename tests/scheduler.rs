// tests/scheduler.rs

mod common;

use common::{fan_out, init_tracing, staggered, ScenarioBuilder};
use dagsim::dag::{compute_states, Admission, Schedule, Scenario, TaskState};
use dagsim::errors::SimError;
use dagsim::types::Strategy;

#[test]
fn parallel_runs_every_eligible_task_at_once() {
    init_tracing();
    let scenario = fan_out();

    let at = |t| compute_states(&scenario, t, None);

    let s = at(0);
    assert_eq!(s.get("A"), Some(TaskState::Running));
    assert_eq!(s.get("B"), Some(TaskState::Pending));
    assert_eq!(s.get("C"), Some(TaskState::Pending));

    let s = at(2);
    assert_eq!(s.get("A"), Some(TaskState::Completed));
    assert_eq!(s.get("B"), Some(TaskState::Running));
    assert_eq!(s.get("C"), Some(TaskState::Running));

    let s = at(3);
    assert_eq!(s.get("B"), Some(TaskState::Running));
    assert_eq!(s.get("C"), Some(TaskState::Completed));

    assert!(at(5).all_completed());
    assert!(!at(4).all_completed());
}

#[test]
fn single_slot_runs_one_task_at_a_time_in_id_order() {
    init_tracing();
    let scenario = fan_out();
    let schedule = Schedule::build(&scenario, Admission::capped(1));

    assert_eq!(schedule.start_order(), vec!["A", "B", "C"]);
    assert_eq!(schedule.makespan(), 6);

    // C became eligible at 2 but waits for B to free the slot.
    assert_eq!(schedule.state_of("C", 3).unwrap(), TaskState::Eligible);
    assert_eq!(schedule.state_of("C", 5).unwrap(), TaskState::Running);
    assert_eq!(schedule.state_of("C", 6).unwrap(), TaskState::Completed);

    let c = schedule.timeline_of("C").unwrap();
    assert_eq!((c.eligible_at, c.started_at, c.completed_at), (2, 5, 6));
}

#[test]
fn capped_admission_prefers_earliest_eligible() {
    let schedule = Schedule::build(&staggered(), Admission::capped(1));

    // X was ready at 0, before B and C, so it goes next even though its id
    // sorts after theirs.
    assert_eq!(schedule.start_order(), vec!["A", "X", "B", "C", "Y", "D"]);
    assert_eq!(schedule.makespan(), 11);
}

#[test]
fn capped_admission_with_two_slots() {
    let schedule = Schedule::build(&staggered(), Admission::capped(2));
    assert_eq!(schedule.makespan(), 6);
    assert_eq!(schedule.timeline_of("C").unwrap().started_at, 2);
    assert_eq!(schedule.timeline_of("D").unwrap().started_at, 5);

    for t in 0..=schedule.makespan() {
        assert!(schedule.states_at(t).count(TaskState::Running) <= 2);
    }
}

#[test]
fn zero_cap_is_clamped_to_one() {
    assert_eq!(Admission::capped(0), Admission::Capped(1));
    assert_eq!(Admission::from_limit(Some(0)), Admission::Capped(1));
    assert_eq!(Admission::from_limit(None), Admission::Unlimited);
}

#[test]
fn staged_waits_for_the_whole_wave() {
    init_tracing();
    let scenario = staggered();
    let staged = Schedule::build(&scenario, Admission::Staged);
    let parallel = Schedule::build(&scenario, Admission::Unlimited);

    // D's only dependency finished at 2, but wave 1 still has B running.
    assert_eq!(staged.state_of("D", 2).unwrap(), TaskState::Eligible);
    assert_eq!(parallel.state_of("D", 2).unwrap(), TaskState::Running);
    assert_eq!(staged.timeline_of("D").unwrap().started_at, 5);

    // The other component is not held back by the first one.
    assert_eq!(staged.timeline_of("Y").unwrap().started_at, 2);

    assert_eq!(staged.makespan(), 6);
    assert_eq!(parallel.makespan(), 5);
}

#[test]
fn strategies_map_onto_admission_rules() {
    let scenario = staggered();
    assert_eq!(
        Schedule::build(&scenario, Strategy::Sequential.admission()).makespan(),
        scenario.total_duration()
    );
    assert_eq!(
        Schedule::build(&scenario, Strategy::Parallel.admission()).makespan(),
        scenario.critical_path().length
    );
}

#[test]
fn unknown_task_is_an_error_not_a_state() {
    let schedule = Schedule::build(&fan_out(), Admission::Unlimited);
    match schedule.state_of("Z", 0) {
        Err(SimError::InvalidTask(id)) => assert_eq!(id, "Z"),
        other => panic!("expected InvalidTask, got {other:?}"),
    }
    assert_eq!(schedule.states_at(0).get("Z"), None);
}

#[test]
fn states_are_a_pure_function_of_time() {
    let scenario = staggered();
    let first = compute_states(&scenario, 3, Some(2));
    let again = compute_states(&scenario, 3, Some(2));
    assert_eq!(first, again);

    // Querying out of order gives the same answer as querying in order.
    let schedule = Schedule::build(&scenario, Admission::capped(2));
    let later = schedule.states_at(5);
    let _ = schedule.states_at(1);
    assert_eq!(schedule.states_at(5), later);
}

#[test]
fn time_past_the_end_is_all_completed() {
    let scenario = fan_out();
    let states = compute_states(&scenario, 1_000, None);
    assert_eq!(states.count(TaskState::Completed), 3);
}

#[test]
fn empty_scenario_schedules_trivially() {
    let scenario = Scenario::new("empty", vec![]).unwrap();
    let schedule = Schedule::build(&scenario, Admission::Staged);
    assert_eq!(schedule.makespan(), 0);
    assert!(schedule.states_at(0).is_empty());
    assert_eq!(schedule.next_event_after(0), None);
}

#[test]
fn zero_duration_tasks_complete_instantly() {
    let scenario = ScenarioBuilder::new("instant")
        .task("A", 0, &[])
        .task("B", 2, &["A"])
        .build();
    let schedule = Schedule::build(&scenario, Admission::Unlimited);
    assert_eq!(schedule.state_of("A", 0).unwrap(), TaskState::Completed);
    assert_eq!(schedule.state_of("B", 0).unwrap(), TaskState::Running);
    assert_eq!(schedule.makespan(), 2);
}

#[test]
fn steps_are_ordered_and_cover_every_transition() {
    let schedule = Schedule::build(&fan_out(), Admission::capped(1));
    let steps = schedule.steps();
    assert_eq!(steps.len(), 9);
    assert!(steps.windows(2).all(|w| w[0].at <= w[1].at));

    let c: Vec<(u64, TaskState)> = steps
        .iter()
        .filter(|s| s.task == "C")
        .map(|s| (s.at, s.state))
        .collect();
    assert_eq!(
        c,
        vec![
            (2, TaskState::Eligible),
            (5, TaskState::Running),
            (6, TaskState::Completed)
        ]
    );

    assert_eq!(schedule.next_event_after(0), Some(2));
    assert_eq!(schedule.next_event_after(2), Some(5));
    assert_eq!(schedule.next_event_after(6), None);
}
