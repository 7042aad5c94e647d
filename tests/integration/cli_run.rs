// tests/integration/cli_run.rs

use std::io::Write;

use clap::Parser;
use dagsim::cli::{CliArgs, Command};
use dagsim::types::{BackoffKind, Strategy};
use dagsim::run;
use tempfile::NamedTempFile;

use crate::common::init_tracing;

const SMALL: &str = r#"
[scenario]
name = "small"

[playback]
tick_ms = 10

[retry]
base_delay_ms = 5
max_attempts = 3

[task.A]
duration = 2

[task.B]
duration = 3
after = ["A"]

[task.C]
duration = 1
after = ["A"]
"#;

fn scenario_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{SMALL}").unwrap();
    file
}

fn args(file: &NamedTempFile, rest: &[&str]) -> CliArgs {
    let path = file.path().to_str().unwrap();
    let mut argv = vec!["dagsim", "--scenario", path];
    argv.extend_from_slice(rest);
    CliArgs::try_parse_from(argv).unwrap()
}

#[test]
fn parses_subcommands_and_flags() {
    let file = scenario_file();

    let parsed = args(&file, &["states", "--at", "3", "--strategy", "staged"]);
    match parsed.command {
        Command::States(states) => {
            assert_eq!(states.at, 3);
            assert_eq!(states.schedule.strategy, Strategy::Staged);
            assert_eq!(states.schedule.concurrency, None);
        }
        other => panic!("expected states, got {other:?}"),
    }

    let parsed = args(&file, &["retry", "--policy", "linear", "--seed", "9"]);
    match parsed.command {
        Command::Retry(retry) => {
            assert_eq!(retry.seed, Some(9));
            assert_eq!(retry.policy, Some(BackoffKind::Linear));
            assert!(!retry.realtime);
        }
        other => panic!("expected retry, got {other:?}"),
    }

    assert!(CliArgs::try_parse_from(["dagsim", "states"]).is_err());
}

#[tokio::test]
async fn check_compare_and_states_run_against_a_file() {
    init_tracing();
    let file = scenario_file();

    run(args(&file, &["check"])).await.unwrap();
    run(args(&file, &["compare"])).await.unwrap();
    run(args(&file, &["states", "--at", "3", "--concurrency", "1"]))
        .await
        .unwrap();
}

#[tokio::test]
async fn retry_runs_with_a_seed() {
    let file = scenario_file();
    run(args(&file, &["retry", "--seed", "1", "--failure-rate", "100"]))
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn play_runs_to_the_end() {
    let file = scenario_file();
    run(args(&file, &["play", "--strategy", "sequential", "--speed", "2"]))
        .await
        .unwrap();
}

#[tokio::test]
async fn invalid_overrides_are_reported() {
    let file = scenario_file();
    assert!(run(args(&file, &["play", "--speed", "0"])).await.is_err());
    assert!(run(args(&file, &["retry", "--attempts", "0"])).await.is_err());
}

#[tokio::test]
async fn missing_scenario_file_is_an_error() {
    let args = CliArgs::try_parse_from(["dagsim", "--scenario", "/nonexistent/Scenario.toml", "check"])
        .unwrap();
    assert!(run(args).await.is_err());
}
