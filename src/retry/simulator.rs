// src/retry/simulator.rs

use std::fmt;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::errors::{Result, SimError};
use crate::retry::outcome::{AttemptOutcome, OutcomeSource};
use crate::retry::policy::BackoffPolicy;

/// Parameters of one retry simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    pub policy: BackoffPolicy,
    /// Attempt cap, initial request included. At least 1.
    pub max_attempts: u32,
    /// Percentage of attempts that fail, `0..=100`.
    pub failure_rate: f64,
}

impl RetryConfig {
    pub fn new(policy: BackoffPolicy, max_attempts: u32, failure_rate: f64) -> Result<Self> {
        if max_attempts == 0 {
            return Err(SimError::ConfigError(
                "retry max_attempts must be >= 1 (got 0)".to_string(),
            ));
        }
        if !(0.0..=100.0).contains(&failure_rate) {
            return Err(SimError::ConfigError(format!(
                "retry failure_rate must be within 0..=100 (got {failure_rate})"
            )));
        }
        Ok(Self {
            policy,
            max_attempts,
            failure_rate,
        })
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            policy: BackoffPolicy::default(),
            max_attempts: 5,
            failure_rate: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Idle,
    /// Waiting for attempt `n` to fire.
    Attempting(u32),
    Succeeded { attempts: u32 },
    Exhausted { attempts: u32 },
}

impl RetryState {
    pub fn is_finished(&self) -> bool {
        matches!(self, RetryState::Succeeded { .. } | RetryState::Exhausted { .. })
    }
}

impl fmt::Display for RetryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryState::Idle => write!(f, "idle"),
            RetryState::Attempting(n) => write!(f, "attempting({n})"),
            RetryState::Succeeded { attempts } => write!(f, "succeeded after {attempts}"),
            RetryState::Exhausted { attempts } => write!(f, "exhausted after {attempts}"),
        }
    }
}

/// One resolved attempt. Never modified after it is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptRecord {
    /// 1-based position in the run.
    pub attempt: u32,
    /// Delay waited before this attempt fired.
    pub delay: Duration,
    pub outcome: AttemptOutcome,
}

/// Ticket for an attempt waiting on its backoff delay.
///
/// Bound to the run that issued it: after [`RetrySimulator::reset`] the
/// ticket is stale and [`RetrySimulator::fire`] ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAttempt {
    generation: u64,
    pub attempt: u32,
    pub delay: Duration,
}

/// Observable state of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySnapshot {
    pub state: RetryState,
    pub history: Vec<AttemptRecord>,
}

impl RetrySnapshot {
    /// Sum of every delay waited so far.
    pub fn total_delay(&self) -> Duration {
        self.history.iter().map(|r| r.delay).sum()
    }
}

/// Pure retry state machine:
/// `idle -> attempting(n) -> succeeded | attempting(n + 1) | exhausted`.
///
/// The simulator never sleeps. [`start`](Self::start) and
/// [`fire`](Self::fire) hand out [`PendingAttempt`] tickets carrying the
/// delay; whoever drives the run decides how to wait for it.
#[derive(Debug)]
pub struct RetrySimulator<S> {
    config: RetryConfig,
    source: S,
    state: RetryState,
    history: Vec<AttemptRecord>,
    generation: u64,
}

impl<S: OutcomeSource> RetrySimulator<S> {
    pub fn new(config: RetryConfig, source: S) -> Self {
        Self {
            config,
            source,
            state: RetryState::Idle,
            history: Vec::new(),
            generation: 0,
        }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn state(&self) -> RetryState {
        self.state
    }

    pub fn history(&self) -> &[AttemptRecord] {
        &self.history
    }

    pub fn snapshot(&self) -> RetrySnapshot {
        RetrySnapshot {
            state: self.state,
            history: self.history.clone(),
        }
    }

    /// Begin a run: `idle -> attempting(1)`.
    ///
    /// Returns `None` (and changes nothing) if a run is in progress or has
    /// finished without a reset.
    pub fn start(&mut self) -> Option<PendingAttempt> {
        if self.state != RetryState::Idle {
            warn!(state = %self.state, "retry start ignored; reset first");
            return None;
        }
        info!(
            policy = ?self.config.policy.kind,
            max_attempts = self.config.max_attempts,
            failure_rate = self.config.failure_rate,
            "retry run started"
        );
        Some(self.enter_attempt(1))
    }

    /// Resolve the attempt described by `ticket`.
    ///
    /// Returns the ticket for the next attempt when the run continues.
    /// Stale tickets (from before a reset, or for an attempt that is no
    /// longer current) are ignored.
    pub fn fire(&mut self, ticket: PendingAttempt) -> Option<PendingAttempt> {
        if ticket.generation != self.generation
            || self.state != RetryState::Attempting(ticket.attempt)
        {
            debug!(
                attempt = ticket.attempt,
                ticket_generation = ticket.generation,
                generation = self.generation,
                "stale retry ticket ignored"
            );
            return None;
        }

        let n = ticket.attempt;
        let outcome = self.source.draw(self.config.failure_rate);
        self.history.push(AttemptRecord {
            attempt: n,
            delay: ticket.delay,
            outcome,
        });

        match outcome {
            AttemptOutcome::Success => {
                info!(attempt = n, "attempt succeeded");
                self.state = RetryState::Succeeded { attempts: n };
                None
            }
            AttemptOutcome::Failure(reason) if n >= self.config.max_attempts => {
                warn!(attempt = n, %reason, "attempt failed; retries exhausted");
                self.state = RetryState::Exhausted { attempts: n };
                None
            }
            AttemptOutcome::Failure(reason) => {
                debug!(attempt = n, %reason, "attempt failed; backing off");
                Some(self.enter_attempt(n + 1))
            }
        }
    }

    /// Drive the run to a terminal state without waiting on any delay.
    pub fn run_to_completion(&mut self) -> &[AttemptRecord] {
        let mut pending = match self.state {
            RetryState::Idle => self.start(),
            _ => None,
        };
        while let Some(ticket) = pending {
            pending = self.fire(ticket);
        }
        &self.history
    }

    /// Discard the run and return to `idle`. Outstanding tickets go stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.history = Vec::new();
        self.state = RetryState::Idle;
        debug!(generation = self.generation, "retry simulator reset");
    }

    fn enter_attempt(&mut self, attempt: u32) -> PendingAttempt {
        self.state = RetryState::Attempting(attempt);
        let delay = self.config.policy.delay_before(attempt);
        debug!(attempt, delay_ms = delay.as_millis() as u64, "entering attempt");
        PendingAttempt {
            generation: self.generation,
            attempt,
            delay,
        }
    }
}
