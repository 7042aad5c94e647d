// src/retry/runtime.rs

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::errors::Result;
use crate::retry::outcome::OutcomeSource;
use crate::retry::simulator::{PendingAttempt, RetrySimulator, RetrySnapshot};
use crate::retry::{RetryCommand, RetryRuntimeOptions};
use crate::subscription::{publish_if_changed, Subscription};

enum Wake {
    Command(Option<RetryCommand>),
    Fire(PendingAttempt),
}

/// Async shell that waits out backoff delays in wall-clock time.
///
/// At most one delay is outstanding. It is held as a plain deadline and
/// only polled inside a `biased` select that checks commands first, so a
/// reset or shutdown always wins over an attempt that is due at the same
/// moment, and a reset drops the deadline outright.
#[derive(Debug)]
pub struct RetryRuntime<S> {
    simulator: RetrySimulator<S>,
    commands: mpsc::Receiver<RetryCommand>,
    snapshots: watch::Sender<RetrySnapshot>,
    options: RetryRuntimeOptions,
}

impl<S: OutcomeSource + Send> RetryRuntime<S> {
    pub fn new(
        simulator: RetrySimulator<S>,
        commands: mpsc::Receiver<RetryCommand>,
        options: RetryRuntimeOptions,
    ) -> Self {
        let (snapshots, _) = watch::channel(simulator.snapshot());
        Self {
            simulator,
            commands,
            snapshots,
            options,
        }
    }

    /// Observe run snapshots. Only changed snapshots are delivered.
    pub fn subscribe(&self) -> Subscription<RetrySnapshot> {
        Subscription::new(self.snapshots.subscribe())
    }

    /// Main loop. Returns the final snapshot.
    pub async fn run(mut self) -> Result<RetrySnapshot> {
        info!("retry runtime started");
        let mut pending: Option<(PendingAttempt, Instant)> = None;

        loop {
            let wake = match pending {
                Some((ticket, deadline)) => {
                    tokio::select! {
                        biased;
                        cmd = self.commands.recv() => Wake::Command(cmd),
                        _ = sleep_until(deadline) => Wake::Fire(ticket),
                    }
                }
                None => Wake::Command(self.commands.recv().await),
            };

            match wake {
                Wake::Fire(ticket) => {
                    pending = with_deadline(self.simulator.fire(ticket));
                }
                Wake::Command(None) => {
                    info!("retry command channel closed; exiting");
                    break;
                }
                Wake::Command(Some(RetryCommand::Shutdown)) => {
                    info!("retry shutdown requested");
                    break;
                }
                Wake::Command(Some(RetryCommand::Start)) => {
                    if let Some(ticket) = self.simulator.start() {
                        pending = with_deadline(Some(ticket));
                    }
                }
                Wake::Command(Some(RetryCommand::Reset)) => {
                    if pending.take().is_some() {
                        debug!("pending attempt cancelled by reset");
                    }
                    self.simulator.reset();
                }
            }

            publish_if_changed(&self.snapshots, self.simulator.snapshot());

            if self.options.exit_when_finished && self.simulator.state().is_finished() {
                info!(state = %self.simulator.state(), "retry run finished; stopping runtime");
                break;
            }
        }

        Ok(self.simulator.snapshot())
    }
}

/// Delays too large for the clock are treated as "practically never".
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn with_deadline(ticket: Option<PendingAttempt>) -> Option<(PendingAttempt, Instant)> {
    ticket.map(|t| {
        let now = Instant::now();
        let deadline = now
            .checked_add(t.delay)
            .unwrap_or_else(|| now + FAR_FUTURE);
        (t, deadline)
    })
}
