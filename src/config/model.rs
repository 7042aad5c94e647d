// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::cost::pricing::{
    DEFAULT_CHARS_PER_TOKEN, DEFAULT_INPUT_PER_MILLION, DEFAULT_OUTPUT_PER_MILLION, PricingModel,
    TokenEstimationConfig,
};
use crate::dag::Scenario;
use crate::playback::PlaybackSettings;
use crate::retry::RetryConfig;
use crate::types::{BackoffKind, ChatRole};

/// Scenario file as read from TOML, before validation.
///
/// ```toml
/// [scenario]
/// name = "Research assistant"
///
/// [pricing]
/// input_per_million = 3.0
/// output_per_million = 15.0
///
/// [task.plan]
/// duration = 2
/// input_tokens = 1200
///
/// [task.search]
/// duration = 3
/// after = ["plan"]
///
/// [[chat]]
/// role = "user"
/// text = "Find me three papers on speculative decoding."
/// at = 0
/// ```
///
/// All sections except `[task.<id>]` are optional and have defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct RawScenarioFile {
    #[serde(default)]
    pub scenario: ScenarioSection,

    #[serde(default)]
    pub pricing: PricingSection,

    #[serde(default)]
    pub tokens: TokensSection,

    #[serde(default)]
    pub overhead: OverheadSection,

    #[serde(default)]
    pub playback: PlaybackSection,

    #[serde(default)]
    pub retry: RetrySection,

    /// All tasks from `[task.<id>]`, keyed by id.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,

    /// Conversation transcript from `[[chat]]`.
    #[serde(default)]
    pub chat: Vec<ChatTurnConfig>,
}

/// Validated scenario file: every section converted into engine types.
///
/// Obtained via `ScenarioFile::try_from(raw)` or
/// [`crate::config::load_and_validate`].
#[derive(Debug, Clone)]
pub struct ScenarioFile {
    pub scenario: Scenario,
    pub pricing: PricingModel,
    pub tokens: TokenEstimationConfig,
    pub playback: PlaybackSettings,
    pub retry: RetryConfig,
}

/// `[scenario]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioSection {
    #[serde(default = "default_scenario_name")]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,
}

fn default_scenario_name() -> String {
    "untitled".to_string()
}

impl Default for ScenarioSection {
    fn default() -> Self {
        Self {
            name: default_scenario_name(),
            description: None,
        }
    }
}

/// `[pricing]` section, USD per million tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct PricingSection {
    #[serde(default = "default_input_per_million")]
    pub input_per_million: f64,

    #[serde(default = "default_output_per_million")]
    pub output_per_million: f64,
}

fn default_input_per_million() -> f64 {
    DEFAULT_INPUT_PER_MILLION
}

fn default_output_per_million() -> f64 {
    DEFAULT_OUTPUT_PER_MILLION
}

impl Default for PricingSection {
    fn default() -> Self {
        Self {
            input_per_million: default_input_per_million(),
            output_per_million: default_output_per_million(),
        }
    }
}

/// `[tokens]` section: how token counts are estimated from text.
#[derive(Debug, Clone, Deserialize)]
pub struct TokensSection {
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: f64,
}

fn default_chars_per_token() -> f64 {
    DEFAULT_CHARS_PER_TOKEN
}

impl Default for TokensSection {
    fn default() -> Self {
        Self {
            chars_per_token: default_chars_per_token(),
        }
    }
}

/// `[overhead]` section: coordination cost of the staged strategy.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OverheadSection {
    #[serde(default)]
    pub staged_input_tokens_per_wave: u64,

    #[serde(default)]
    pub staged_output_tokens_per_wave: u64,
}

/// `[playback]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackSection {
    /// Wall-clock milliseconds per tick.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Simulated units per tick at speed 1.0.
    #[serde(default = "default_units_per_tick")]
    pub units_per_tick: u64,

    #[serde(default = "default_speed")]
    pub speed: f64,
}

fn default_tick_ms() -> u64 {
    100
}

fn default_units_per_tick() -> u64 {
    1
}

fn default_speed() -> f64 {
    1.0
}

impl Default for PlaybackSection {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            units_per_tick: default_units_per_tick(),
            speed: default_speed(),
        }
    }
}

/// `[retry]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySection {
    /// `"none"`, `"linear"` or `"exponential"`.
    #[serde(default)]
    pub policy: BackoffKind,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default)]
    pub max_delay_ms: Option<u64>,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Percentage of attempts that fail.
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_attempts() -> u32 {
    5
}

fn default_failure_rate() -> f64 {
    30.0
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            policy: BackoffKind::default(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: None,
            max_attempts: default_max_attempts(),
            failure_rate: default_failure_rate(),
        }
    }
}

/// `[task.<id>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    /// Display label.
    #[serde(default)]
    pub label: Option<String>,

    /// Simulated time units needed once started.
    pub duration: u64,

    /// Ids of tasks that must complete first.
    #[serde(default)]
    pub after: Vec<String>,

    /// Explicit input token count. Estimated from `prompt` when absent.
    #[serde(default)]
    pub input_tokens: Option<u64>,

    /// Explicit output token count. Estimated from `response` when absent.
    #[serde(default)]
    pub output_tokens: Option<u64>,

    #[serde(default)]
    pub prompt: Option<String>,

    #[serde(default)]
    pub response: Option<String>,
}

impl TaskConfig {
    /// Input tokens, stated or estimated.
    pub fn effective_input_tokens(&self, estimation: &TokenEstimationConfig) -> u64 {
        self.input_tokens.unwrap_or_else(|| {
            self.prompt
                .as_deref()
                .map(|p| estimation.estimate(p))
                .unwrap_or(0)
        })
    }

    /// Output tokens, stated or estimated.
    pub fn effective_output_tokens(&self, estimation: &TokenEstimationConfig) -> u64 {
        self.output_tokens.unwrap_or_else(|| {
            self.response
                .as_deref()
                .map(|r| estimation.estimate(r))
                .unwrap_or(0)
        })
    }
}

/// `[[chat]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatTurnConfig {
    pub role: ChatRole,

    pub text: String,

    /// Offset at which the turn appears during playback.
    #[serde(default)]
    pub at: u64,

    /// Explicit token count; estimated from `text` when absent.
    #[serde(default)]
    pub tokens: Option<u64>,
}
