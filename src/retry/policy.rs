// src/retry/policy.rs

use std::time::Duration;

use crate::types::BackoffKind;

/// Maps an attempt number to the delay before it fires.
///
/// Attempt 1 is the initial request and fires immediately. Attempt `n + 1`
/// is retry `n` and waits:
/// - `none`: nothing
/// - `linear`: `base * n`
/// - `exponential`: `base * 2^n`
///
/// optionally capped by `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub kind: BackoffKind,
    pub base_delay: Duration,
    pub max_delay: Option<Duration>,
}

impl BackoffPolicy {
    pub fn new(kind: BackoffKind, base_delay: Duration) -> Self {
        Self {
            kind,
            base_delay,
            max_delay: None,
        }
    }

    pub fn none() -> Self {
        Self::new(BackoffKind::None, Duration::ZERO)
    }

    pub fn linear(base_delay: Duration) -> Self {
        Self::new(BackoffKind::Linear, base_delay)
    }

    pub fn exponential(base_delay: Duration) -> Self {
        Self::new(BackoffKind::Exponential, base_delay)
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Delay before `attempt` (1-based) fires.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        let retry = attempt.saturating_sub(1);
        if retry == 0 {
            return Duration::ZERO;
        }

        let raw = match self.kind {
            BackoffKind::None => Duration::ZERO,
            BackoffKind::Linear => self.base_delay.saturating_mul(retry),
            BackoffKind::Exponential => self.base_delay.saturating_mul(2u32.saturating_pow(retry)),
        };

        match self.max_delay {
            Some(cap) => raw.min(cap),
            None => raw,
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::exponential(Duration::from_millis(1000))
    }
}
