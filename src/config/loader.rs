// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{RawScenarioFile, ScenarioFile};
use crate::errors::Result;

/// Load a scenario file from a given path and return the raw `RawScenarioFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation (DAG correctness, etc.). Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawScenarioFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = contents.len(), "read scenario file");

    let raw: RawScenarioFile = toml::from_str(&contents)?;

    Ok(raw)
}

/// Load a scenario file from path and validate it.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for:
///   - unknown or self `after` references,
///   - DAG cycles,
///   - pricing, playback and retry sanity.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ScenarioFile> {
    let raw = load_from_path(&path)?;
    ScenarioFile::try_from(raw)
}

/// Parse and validate scenario TOML held in memory (e.g. embedded content).
pub fn load_from_str(contents: &str) -> Result<ScenarioFile> {
    let raw: RawScenarioFile = toml::from_str(contents)?;
    ScenarioFile::try_from(raw)
}

/// Default scenario path: `Scenario.toml` in the current working directory.
pub fn default_scenario_path() -> PathBuf {
    PathBuf::from("Scenario.toml")
}
