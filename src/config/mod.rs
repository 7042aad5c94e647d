// src/config/mod.rs

//! Scenario file loading and validation.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_scenario_path, load_and_validate, load_from_path, load_from_str};
pub use model::{
    ChatTurnConfig, OverheadSection, PlaybackSection, PricingSection, RawScenarioFile,
    RetrySection, ScenarioFile, ScenarioSection, TaskConfig, TokensSection,
};
