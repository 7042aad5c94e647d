// tests/integration/error_handling.rs

use std::io::Write;

use dagsim::config::{load_and_validate, load_from_str};
use dagsim::cost::{compare, latency};
use dagsim::dag::{Admission, Schedule};
use dagsim::types::Strategy;
use dagsim::errors::{ScenarioError, SimError};
use tempfile::NamedTempFile;

use crate::common::init_tracing;

fn write_scenario(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_dag_cycle_returns_structured_error() {
    init_tracing();
    let file = write_scenario(
        r#"
[task.A]
duration = 1
after = ["B"]

[task.B]
duration = 1
after = ["A"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(SimError::Scenario(ScenarioError::Cycle { task })) => {
            assert!(task == "A" || task == "B");
        }
        Err(e) => panic!("Expected Cycle error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_dependency_returns_scenario_error() {
    let file = write_scenario(
        r#"
[task.A]
duration = 1
after = ["NonExistent"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(SimError::Scenario(err @ ScenarioError::UnknownDependency { .. })) => {
            let msg = err.to_string();
            assert!(msg.contains("unknown dependency"));
            assert!(msg.contains("NonExistent"));
        }
        Err(e) => panic!("Expected UnknownDependency, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_self_dependency_returns_scenario_error() {
    let file = write_scenario(
        r#"
[task.A]
duration = 1
after = ["A"]
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(SimError::Scenario(ScenarioError::SelfDependency(_)))
    ));
}

#[test]
fn test_file_without_tasks_is_rejected() {
    let file = write_scenario(
        r#"
[scenario]
name = "nothing to do"
"#,
    );

    match load_and_validate(file.path()) {
        Err(SimError::ConfigError(msg)) => assert!(msg.contains("at least one")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_missing_duration_is_a_toml_error() {
    let file = write_scenario(
        r#"
[task.A]
after = []
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(SimError::TomlError(_))
    ));
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.toml");
    assert!(matches!(load_and_validate(&path), Err(SimError::IoError(_))));
}

#[test]
fn test_out_of_range_settings_are_config_errors() {
    let cases = [
        ("[pricing]\ninput_per_million = -1.0", "input_per_million"),
        ("[tokens]\nchars_per_token = 0.0", "chars_per_token"),
        ("[playback]\ntick_ms = 0", "tick_ms"),
        ("[playback]\nspeed = 0.0", "speed"),
        ("[playback]\nunits_per_tick = 0", "units_per_tick"),
        ("[retry]\nmax_attempts = 0", "max_attempts"),
        ("[retry]\nfailure_rate = 150.0", "failure_rate"),
    ];

    for (section, field) in cases {
        let file = write_scenario(&format!("{section}\n\n[task.A]\nduration = 1\n"));
        match load_and_validate(file.path()) {
            Err(SimError::ConfigError(msg)) => {
                assert!(msg.contains(field), "message {msg:?} should name {field}")
            }
            Err(e) => panic!("Expected ConfigError for {field}, got: {:?}", e),
            Ok(_) => panic!("Expected error for {field}, got Ok"),
        }
    }
}

#[test]
fn test_unknown_backoff_policy_is_rejected() {
    let file = write_scenario(
        r#"
[retry]
policy = "fibonacci"

[task.A]
duration = 1
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(SimError::TomlError(_))
    ));
}

#[test]
fn test_huge_durations_and_token_counts_saturate_instead_of_panicking() {
    init_tracing();
    // TOML integers top out at i64::MAX; three of them overflow a u64 sum.
    let file = load_from_str(
        r#"
[overhead]
staged_input_tokens_per_wave = 9223372036854775807

[task.a]
duration = 9223372036854775807
input_tokens = 9223372036854775807
output_tokens = 9223372036854775807

[task.b]
duration = 9223372036854775807
after = ["a"]
input_tokens = 9223372036854775807

[task.c]
duration = 9223372036854775807
after = ["a"]
input_tokens = 9223372036854775807
"#,
    )
    .unwrap();
    let scenario = &file.scenario;
    let big = i64::MAX as u64;

    assert_eq!(scenario.total_duration(), u64::MAX);
    assert_eq!(scenario.critical_path().length, big * 2);
    assert_eq!(scenario.task("a").unwrap().total_tokens(), big * 2);

    let comparison = compare(scenario, &file.pricing);
    assert_eq!(comparison.get(Strategy::Sequential).unwrap().total_latency, u64::MAX);
    assert_eq!(comparison.get(Strategy::Parallel).unwrap().total_latency, big * 2);
    assert_eq!(comparison.get(Strategy::Staged).unwrap().total_latency, big * 2);
    for result in &comparison.results {
        assert_eq!(result.tokens.input, u64::MAX, "{}", result.strategy);
        assert!(result.total_cost.is_finite());
    }

    for strategy in Strategy::ALL {
        assert_eq!(
            Schedule::build(scenario, strategy.admission()).makespan(),
            latency(scenario, strategy)
        );
    }
    assert!(Schedule::build(scenario, Admission::Unlimited)
        .states_at(u64::MAX)
        .all_completed());
}
