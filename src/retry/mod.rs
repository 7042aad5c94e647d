// src/retry/mod.rs

//! Retry/backoff simulation for a single request.
//!
//! - [`policy`] maps attempt numbers to backoff delays.
//! - [`outcome`] decides whether an attempt succeeds, via an injectable
//!   [`OutcomeSource`].
//! - [`simulator`] is the pure attempt state machine.
//! - [`runtime`] waits out delays in wall-clock time.

/// Commands accepted by the retry runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryCommand {
    Start,
    Reset,
    Shutdown,
}

/// Options for the async retry shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryRuntimeOptions {
    /// Exit the loop once the run succeeds or is exhausted.
    pub exit_when_finished: bool,
}

pub mod outcome;
pub mod policy;
pub mod runtime;
pub mod simulator;

pub use outcome::{AttemptOutcome, FailureReason, OutcomeSource, RandomOutcomes};
pub use policy::BackoffPolicy;
pub use runtime::RetryRuntime;
pub use simulator::{
    AttemptRecord, PendingAttempt, RetryConfig, RetrySimulator, RetrySnapshot, RetryState,
};
