// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

/// A malformed scenario.
///
/// Detected eagerly when a scenario is built or loaded. Scenario errors are
/// deterministic, so callers surface them instead of retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("duplicate task id '{0}'")]
    DuplicateTask(String),

    #[error("task '{task}' has unknown dependency '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    #[error("task '{0}' cannot depend on itself")]
    SelfDependency(String),

    #[error("cycle detected in task DAG involving task '{task}'")]
    Cycle { task: String },

    #[error("{0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    #[error("Invalid task: {0}")]
    InvalidTask(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SimError>;
