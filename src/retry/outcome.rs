// src/retry/outcome.rs

//! Attempt outcomes and the injectable source that decides them.
//!
//! Simulated failures are plain data. They never surface as `SimError`s.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Why a simulated attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    RateLimited,
    Timeout,
    ServerError,
    Overloaded,
}

impl FailureReason {
    pub const ALL: [FailureReason; 4] = [
        FailureReason::RateLimited,
        FailureReason::Timeout,
        FailureReason::ServerError,
        FailureReason::Overloaded,
    ];
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureReason::RateLimited => "429 rate limited",
            FailureReason::Timeout => "request timed out",
            FailureReason::ServerError => "500 internal server error",
            FailureReason::Overloaded => "529 overloaded",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Failure(FailureReason),
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AttemptOutcome::Success)
    }
}

/// Decides the outcome of each attempt.
///
/// Production uses [`RandomOutcomes`]; tests can provide a scripted
/// implementation that returns a fixed sequence.
pub trait OutcomeSource {
    /// Draw one outcome. `failure_rate` is a percentage in `0..=100`.
    fn draw(&mut self, failure_rate: f64) -> AttemptOutcome;
}

/// Bernoulli outcomes drawn from a `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomOutcomes<R> {
    rng: R,
}

impl<R: Rng> RandomOutcomes<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomOutcomes<StdRng> {
    /// Reproducible outcomes for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Outcomes seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> OutcomeSource for RandomOutcomes<R> {
    fn draw(&mut self, failure_rate: f64) -> AttemptOutcome {
        let p = if failure_rate.is_nan() {
            0.0
        } else {
            (failure_rate / 100.0).clamp(0.0, 1.0)
        };
        if self.rng.random_bool(p) {
            let reason = FailureReason::ALL[self.rng.random_range(0..FailureReason::ALL.len())];
            AttemptOutcome::Failure(reason)
        } else {
            AttemptOutcome::Success
        }
    }
}

impl<S: OutcomeSource + ?Sized> OutcomeSource for &mut S {
    fn draw(&mut self, failure_rate: f64) -> AttemptOutcome {
        (**self).draw(failure_rate)
    }
}

impl<S: OutcomeSource + ?Sized> OutcomeSource for Box<S> {
    fn draw(&mut self, failure_rate: f64) -> AttemptOutcome {
        (**self).draw(failure_rate)
    }
}
