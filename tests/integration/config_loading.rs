// tests/integration/config_loading.rs

use std::time::Duration;

use dagsim::config::{load_from_str, ScenarioFile};
use dagsim::cost::compare;
use dagsim::types::{BackoffKind, ChatRole, Strategy, TokenKind};
use dagsim_test_utils::builders::{ScenarioFileBuilder, TaskConfigBuilder};

use crate::common::init_tracing;

const RESEARCH: &str = r#"
[scenario]
name = "Research assistant"
description = "Plan, search twice, then summarise."

[pricing]
input_per_million = 2.0
output_per_million = 8.0

[overhead]
staged_input_tokens_per_wave = 300

[playback]
tick_ms = 50
units_per_tick = 2
speed = 1.5

[retry]
policy = "linear"
base_delay_ms = 250
max_delay_ms = 1000
max_attempts = 4
failure_rate = 25.0

[task.plan]
label = "Plan the search"
duration = 2
input_tokens = 1200
output_tokens = 300

[task.search_a]
duration = 3
after = ["plan"]
prompt = "0123456789012345678901234567890123456789"

[task.search_b]
duration = 5
after = ["plan"]

[task.summarise]
duration = 1
after = ["search_a", "search_b"]
response = "abcdefgh"

[[chat]]
role = "assistant"
text = "Here is what I found."
at = 10

[[chat]]
role = "user"
text = "Find three papers on speculative decoding."
"#;

fn research() -> ScenarioFile {
    load_from_str(RESEARCH).unwrap()
}

#[test]
fn sections_are_converted_into_engine_types() {
    init_tracing();
    let file = research();

    assert_eq!(file.scenario.name(), "Research assistant");
    assert!(file.scenario.description().is_some());
    assert_eq!(file.scenario.tasks().len(), 4);

    assert_eq!(file.pricing.price_per_million(TokenKind::Input), 2.0);
    assert_eq!(file.pricing.price_per_million(TokenKind::Output), 8.0);

    assert_eq!(file.playback.tick, Duration::from_millis(50));
    assert_eq!(file.playback.units_per_tick, 2);
    assert_eq!(file.playback.speed, 1.5);

    assert_eq!(file.retry.policy.kind, BackoffKind::Linear);
    assert_eq!(file.retry.policy.base_delay, Duration::from_millis(250));
    assert_eq!(file.retry.policy.max_delay, Some(Duration::from_millis(1000)));
    assert_eq!(file.retry.max_attempts, 4);
    assert_eq!(file.retry.failure_rate, 25.0);

    assert_eq!(file.scenario.overhead().staged_input_tokens_per_wave, 300);
}

#[test]
fn token_counts_are_estimated_from_text_when_absent() {
    let file = research();
    let scenario = &file.scenario;

    let plan = scenario.task("plan").unwrap();
    assert_eq!((plan.input_tokens, plan.output_tokens), (1200, 300));
    assert_eq!(plan.label.as_deref(), Some("Plan the search"));

    // 40 characters at 4 characters per token.
    assert_eq!(scenario.task("search_a").unwrap().input_tokens, 10);
    assert_eq!(scenario.task("search_b").unwrap().total_tokens(), 0);
    assert_eq!(scenario.task("summarise").unwrap().output_tokens, 2);
}

#[test]
fn chat_turns_are_sorted_and_estimated() {
    let file = research();
    let transcript = file.scenario.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].role, ChatRole::User);
    assert_eq!(transcript[0].at, 0);
    assert_eq!(transcript[1].role, ChatRole::Assistant);
    assert_eq!(transcript[1].tokens, 6);
}

#[test]
fn loaded_scenario_scores_every_strategy() {
    let file = research();
    let comparison = compare(&file.scenario, &file.pricing);

    let seq = comparison.get(Strategy::Sequential).unwrap();
    let par = comparison.get(Strategy::Parallel).unwrap();
    let staged = comparison.get(Strategy::Staged).unwrap();

    assert_eq!(seq.total_latency, 11);
    assert_eq!(par.total_latency, 8);
    assert_eq!(staged.total_latency, 8);
    assert_eq!(staged.waves, 3);
    assert_eq!(staged.tokens.input, seq.tokens.input + 900);
}

#[test]
fn defaults_apply_to_missing_sections() {
    let file = load_from_str("[task.only]\nduration = 4\n").unwrap();
    assert_eq!(file.scenario.name(), "untitled");
    assert_eq!(file.playback.tick, Duration::from_millis(100));
    assert_eq!(file.retry.policy.kind, BackoffKind::Exponential);
    assert_eq!(file.retry.max_attempts, 5);
    assert_eq!(file.retry.failure_rate, 30.0);
    assert_eq!(file.pricing.price_per_million(TokenKind::Input), 3.0);
    assert_eq!(file.pricing.price_per_million(TokenKind::Output), 15.0);
}

#[test]
fn builder_goes_through_the_same_validation() {
    let file = ScenarioFileBuilder::new()
        .with_task("a", TaskConfigBuilder::new(2).tokens(10, 20).build())
        .with_task("b", TaskConfigBuilder::new(1).after("a").prompt("abcdefgh").build())
        .with_chat(ChatRole::System, "You are terse.", 0)
        .with_pricing(1.0, 1.0)
        .build();

    assert_eq!(file.scenario.task("b").unwrap().input_tokens, 2);
    assert_eq!(file.scenario.transcript()[0].tokens, 4);

    let raw = ScenarioFileBuilder::new()
        .with_task("a", TaskConfigBuilder::new(1).after("ghost").build())
        .raw();
    assert!(ScenarioFile::try_from(raw).is_err());
}
