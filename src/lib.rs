// src/lib.rs

pub mod cli;
pub mod config;
pub mod cost;
pub mod dag;
pub mod errors;
pub mod logging;
pub mod playback;
pub mod retry;
pub mod subscription;
pub mod types;

use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::{CliArgs, Command, PlayArgs, RetryArgs, ScheduleArgs, StatesArgs};
use crate::config::loader::load_and_validate;
use crate::config::model::ScenarioFile;
use crate::cost::compare;
use crate::dag::{Admission, Schedule, TaskState};
use crate::playback::{
    Frame, PlaybackCommand, PlaybackRuntime, PlaybackRuntimeOptions, PlaybackSession,
};
use crate::retry::{
    RandomOutcomes, RetryCommand, RetryConfig, RetryRuntime,
    RetryRuntimeOptions, RetrySimulator, RetrySnapshot,
};

/// High-level entry point used by `main.rs`.
///
/// Loads and validates the scenario, then dispatches to the requested
/// command. Scenario errors surface here, before any simulation starts.
pub async fn run(args: CliArgs) -> Result<()> {
    let file = load_and_validate(&args.scenario)?;
    info!(
        scenario = %file.scenario.name(),
        tasks = file.scenario.tasks().len(),
        "scenario loaded"
    );

    match args.command {
        Command::Check => print_check(&file),
        Command::Compare => print_comparison(&file),
        Command::States(states) => print_states(&file, &states)?,
        Command::Play(play) => run_playback(&file, &play).await?,
        Command::Retry(retry) => run_retry(&file, &retry).await?,
    }

    Ok(())
}

fn admission_for(args: &ScheduleArgs) -> Admission {
    match args.concurrency {
        Some(limit) => Admission::capped(limit),
        None => args.strategy.admission(),
    }
}

/// Print tasks, dependencies, waves and the critical path.
fn print_check(file: &ScenarioFile) {
    let scenario = &file.scenario;
    let graph = scenario.graph();

    println!("scenario: {}", scenario.name());
    if let Some(description) = scenario.description() {
        println!("  {description}");
    }
    println!();

    println!("tasks ({}):", scenario.tasks().len());
    for (i, task) in scenario.tasks().iter().enumerate() {
        println!("  - {}", task.id);
        if let Some(ref label) = task.label {
            println!("      label: {label}");
        }
        println!("      duration: {}", task.duration);
        if !task.deps.is_empty() {
            println!("      after: {:?}", task.deps);
        }
        println!(
            "      tokens: {} in / {} out",
            task.input_tokens, task.output_tokens
        );
        println!("      wave: {}", graph.wave_of(i));
    }

    let path = scenario.critical_path();
    println!();
    println!(
        "critical path ({}): {}",
        path.length,
        path.tasks.join(" -> ")
    );
    println!("components: {}", graph.component_count());
    if !scenario.transcript().is_empty() {
        println!("chat turns: {}", scenario.transcript().len());
    }

    debug!("check complete (no simulation)");
}

fn print_comparison(file: &ScenarioFile) {
    let comparison = compare(&file.scenario, &file.pricing);

    println!(
        "{:<12} {:>10} {:>12} {:>12} {:>8} {:>9}",
        "strategy", "latency", "tokens", "cost (USD)", "waves", "speedup"
    );
    for r in &comparison.results {
        println!(
            "{:<12} {:>10} {:>12} {:>12.6} {:>8} {:>8.2}x",
            r.strategy.to_string(),
            r.total_latency,
            r.tokens.total(),
            r.total_cost,
            r.waves,
            r.speedup_vs_baseline
        );
    }

    if let Some(fastest) = comparison.fastest() {
        println!();
        println!("fastest: {}", fastest.strategy);
    }
}

fn print_states(file: &ScenarioFile, args: &StatesArgs) -> Result<()> {
    let schedule = Schedule::build(&file.scenario, admission_for(&args.schedule));

    println!(
        "t = {} (makespan {})",
        args.at,
        schedule.makespan()
    );
    for id in schedule.task_ids() {
        let state = schedule.state_of(id, args.at)?;
        println!("  {id:<20} {state}");
    }
    Ok(())
}

async fn run_playback(file: &ScenarioFile, args: &PlayArgs) -> Result<()> {
    let mut settings = file.playback;
    if let Some(speed) = args.speed {
        if !speed.is_finite() || speed <= 0.0 {
            anyhow::bail!("--speed must be > 0 (got {speed})");
        }
        settings.speed = speed;
    }

    let session =
        PlaybackSession::with_admission(&file.scenario, admission_for(&args.schedule), settings);
    let (tx, rx) = mpsc::channel::<PlaybackCommand>(16);
    let runtime = PlaybackRuntime::new(
        session,
        rx,
        settings.tick,
        PlaybackRuntimeOptions {
            exit_when_finished: true,
        },
    );

    let mut frames = runtime.subscribe();
    let printer = tokio::spawn(async move {
        // The subscription has already seen the starting frame.
        print_frame(&frames.current());
        while let Some(frame) = frames.changed().await {
            print_frame(&frame);
        }
    });

    // Ctrl-C -> pause, then stop.
    {
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(PlaybackCommand::Pause).await;
            let _ = tx.send(PlaybackCommand::Shutdown).await;
        });
    }

    tx.send(PlaybackCommand::Play).await?;
    let last = runtime.run().await?;
    printer.await?;

    info!(
        time = last.playback.current_time,
        state = %last.playback.state,
        "playback ended"
    );
    Ok(())
}

fn print_frame(frame: &Frame) {
    println!("{}", format_frame(frame));
}

/// One line of `play` output.
pub fn format_frame(frame: &Frame) -> String {
    format!(
        "t={:>6} {:<8} running={:?} completed={}/{}",
        frame.playback.current_time,
        frame.playback.state.to_string(),
        frame.states.ids_in(TaskState::Running),
        frame.states.count(TaskState::Completed),
        frame.states.len()
    )
}

async fn run_retry(file: &ScenarioFile, args: &RetryArgs) -> Result<()> {
    let base = file.retry;
    let mut policy = base.policy;
    if let Some(kind) = args.policy {
        policy.kind = kind;
    }
    if let Some(ms) = args.base_ms {
        policy.base_delay = Duration::from_millis(ms);
    }
    let config = RetryConfig::new(
        policy,
        args.attempts.unwrap_or(base.max_attempts),
        args.failure_rate.unwrap_or(base.failure_rate),
    )?;

    let source = match args.seed {
        Some(seed) => RandomOutcomes::seeded(seed),
        None => RandomOutcomes::from_os_rng(),
    };
    let mut simulator = RetrySimulator::new(config, source);

    let snapshot = if args.realtime {
        let (tx, rx) = mpsc::channel::<RetryCommand>(4);
        let runtime = RetryRuntime::new(
            simulator,
            rx,
            RetryRuntimeOptions {
                exit_when_finished: true,
            },
        );
        tx.send(RetryCommand::Start).await?;
        runtime.run().await?
    } else {
        simulator.run_to_completion();
        simulator.snapshot()
    };

    print_retry(&snapshot);
    Ok(())
}

fn print_retry(snapshot: &RetrySnapshot) {
    for record in &snapshot.history {
        let outcome = match record.outcome {
            retry::AttemptOutcome::Success => "success".to_string(),
            retry::AttemptOutcome::Failure(reason) => format!("failed: {reason}"),
        };
        println!(
            "attempt {:>2}  wait {:>7} ms  {}",
            record.attempt,
            record.delay.as_millis(),
            outcome
        );
    }
    println!();
    println!(
        "{} (total wait {} ms)",
        snapshot.state,
        snapshot.total_delay().as_millis()
    );
}
