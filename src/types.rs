// src/types.rs

//! Small shared enums used across the scenario, cost and retry modules.

use std::fmt;

use clap::ValueEnum;
use serde::Deserialize;

use crate::dag::scheduler::Admission;

/// Simulated time, in abstract units (the scenario decides what a unit means).
pub type SimTime = u64;

/// Execution strategy being scored or visualized.
///
/// - `Sequential`: one task at a time, in dependency order.
/// - `Parallel`: every eligible task starts immediately.
/// - `Staged`: an orchestrator batches ready work into dependency waves and
///   waits for a whole wave before releasing the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum Strategy {
    Sequential,
    Parallel,
    #[value(alias = "orchestrated")]
    Staged,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Sequential, Strategy::Parallel, Strategy::Staged];

    /// Scheduler admission rule that plays this strategy back.
    pub fn admission(self) -> Admission {
        match self {
            Strategy::Sequential => Admission::capped(1),
            Strategy::Parallel => Admission::Unlimited,
            Strategy::Staged => Admission::Staged,
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Parallel
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::Sequential => "sequential",
            Strategy::Parallel => "parallel",
            Strategy::Staged => "staged",
        };
        f.write_str(s)
    }
}

/// Shape of the delay curve between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    None,
    Linear,
    Exponential,
}

impl Default for BackoffKind {
    fn default() -> Self {
        BackoffKind::Exponential
    }
}

/// Billable token category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenKind {
    Input,
    Output,
}

/// Speaker of a chat transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}
