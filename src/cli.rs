// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::{BackoffKind, Strategy};

/// Command-line arguments for `dagsim`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dagsim",
    version,
    about = "Play back and score AI task-orchestration strategies over a dependency graph.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the scenario file (TOML).
    ///
    /// Default: `Scenario.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Scenario.toml", global = true)]
    pub scenario: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DAGSIM_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Validate the scenario and print its DAG.
    Check,
    /// Score every strategy and print a comparison table.
    Compare,
    /// Print every task's state at a given simulated time.
    States(StatesArgs),
    /// Play the scenario back in real time, printing each changed frame.
    Play(PlayArgs),
    /// Run one retry/backoff simulation.
    Retry(RetryArgs),
}

/// Strategy selection shared by `states` and `play`.
#[derive(Debug, Clone, Args)]
pub struct ScheduleArgs {
    /// Strategy to visualize.
    #[arg(long, value_enum, default_value_t = Strategy::Parallel)]
    pub strategy: Strategy,

    /// Cap concurrent tasks instead of following the strategy.
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,
}

#[derive(Debug, Clone, Args)]
pub struct StatesArgs {
    /// Simulated time to inspect.
    #[arg(long, value_name = "T")]
    pub at: u64,

    #[command(flatten)]
    pub schedule: ScheduleArgs,
}

#[derive(Debug, Clone, Args)]
pub struct PlayArgs {
    #[command(flatten)]
    pub schedule: ScheduleArgs,

    /// Speed multiplier (overrides `[playback].speed`).
    #[arg(long, value_name = "X")]
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, Args)]
pub struct RetryArgs {
    /// Backoff policy (overrides `[retry].policy`).
    #[arg(long, value_enum)]
    pub policy: Option<BackoffKind>,

    /// Base delay in milliseconds (overrides `[retry].base_delay_ms`).
    #[arg(long, value_name = "MS")]
    pub base_ms: Option<u64>,

    /// Attempt cap (overrides `[retry].max_attempts`).
    #[arg(long, value_name = "N")]
    pub attempts: Option<u32>,

    /// Failure percentage 0-100 (overrides `[retry].failure_rate`).
    #[arg(long, value_name = "PERCENT")]
    pub failure_rate: Option<f64>,

    /// Seed for reproducible outcomes.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Actually wait out the backoff delays.
    #[arg(long)]
    pub realtime: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
