// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{RawScenarioFile, ScenarioFile};
use crate::cost::pricing::{PricingModel, TokenEstimationConfig};
use crate::dag::{ChatTurn, CoordinationOverhead, Scenario, Task};
use crate::errors::{Result, SimError};
use crate::playback::PlaybackSettings;
use crate::retry::{BackoffPolicy, RetryConfig};

impl TryFrom<RawScenarioFile> for ScenarioFile {
    type Error = crate::errors::SimError;

    fn try_from(raw: RawScenarioFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_tasks(&raw)?;
        let pricing = validate_pricing(&raw)?;
        let tokens = validate_tokens(&raw)?;
        let playback = validate_playback(&raw)?;
        let retry = validate_retry(&raw)?;
        let scenario = build_scenario(raw, &tokens)?;

        Ok(ScenarioFile {
            scenario,
            pricing,
            tokens,
            playback,
            retry,
        })
    }
}

fn ensure_has_tasks(cfg: &RawScenarioFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(SimError::ConfigError(
            "scenario must contain at least one [task.<id>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_pricing(cfg: &RawScenarioFile) -> Result<PricingModel> {
    let p = &cfg.pricing;
    for (field, value) in [
        ("input_per_million", p.input_per_million),
        ("output_per_million", p.output_per_million),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(SimError::ConfigError(format!(
                "[pricing].{field} must be a non-negative number (got {value})"
            )));
        }
    }
    Ok(PricingModel::new(p.input_per_million, p.output_per_million))
}

fn validate_tokens(cfg: &RawScenarioFile) -> Result<TokenEstimationConfig> {
    let cpt = cfg.tokens.chars_per_token;
    if !cpt.is_finite() || cpt <= 0.0 {
        return Err(SimError::ConfigError(format!(
            "[tokens].chars_per_token must be > 0 (got {cpt})"
        )));
    }
    Ok(TokenEstimationConfig {
        chars_per_token: cpt,
    })
}

fn validate_playback(cfg: &RawScenarioFile) -> Result<PlaybackSettings> {
    let p = &cfg.playback;
    if p.tick_ms == 0 {
        return Err(SimError::ConfigError(
            "[playback].tick_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    if p.units_per_tick == 0 {
        return Err(SimError::ConfigError(
            "[playback].units_per_tick must be >= 1 (got 0)".to_string(),
        ));
    }
    if !p.speed.is_finite() || p.speed <= 0.0 {
        return Err(SimError::ConfigError(format!(
            "[playback].speed must be > 0 (got {})",
            p.speed
        )));
    }
    Ok(PlaybackSettings {
        tick: Duration::from_millis(p.tick_ms),
        units_per_tick: p.units_per_tick,
        speed: p.speed,
    })
}

fn validate_retry(cfg: &RawScenarioFile) -> Result<RetryConfig> {
    let r = &cfg.retry;
    let mut policy = BackoffPolicy::new(r.policy, Duration::from_millis(r.base_delay_ms));
    if let Some(max) = r.max_delay_ms {
        policy = policy.with_max_delay(Duration::from_millis(max));
    }
    RetryConfig::new(policy, r.max_attempts, r.failure_rate)
}

/// Convert task and chat sections into a validated [`Scenario`].
///
/// DAG validation (unknown or self dependencies, cycles) happens in
/// `Scenario::new` and surfaces as `SimError::Scenario`.
fn build_scenario(raw: RawScenarioFile, tokens: &TokenEstimationConfig) -> Result<Scenario> {
    let tasks: Vec<Task> = raw
        .task
        .iter()
        .map(|(id, tc)| Task {
            id: id.clone(),
            label: tc.label.clone(),
            deps: tc.after.clone(),
            duration: tc.duration,
            input_tokens: tc.effective_input_tokens(tokens),
            output_tokens: tc.effective_output_tokens(tokens),
        })
        .collect();

    let transcript: Vec<ChatTurn> = raw
        .chat
        .into_iter()
        .map(|turn| ChatTurn {
            tokens: turn.tokens.unwrap_or_else(|| tokens.estimate(&turn.text)),
            role: turn.role,
            text: turn.text,
            at: turn.at,
        })
        .collect();

    let overhead = CoordinationOverhead {
        staged_input_tokens_per_wave: raw.overhead.staged_input_tokens_per_wave,
        staged_output_tokens_per_wave: raw.overhead.staged_output_tokens_per_wave,
    };

    let mut scenario = Scenario::new(raw.scenario.name, tasks)?
        .with_transcript(transcript)
        .with_overhead(overhead);
    if let Some(description) = raw.scenario.description {
        scenario = scenario.with_description(description);
    }

    Ok(scenario)
}
