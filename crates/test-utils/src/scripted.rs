use std::collections::VecDeque;

use dagsim::retry::{AttemptOutcome, FailureReason, OutcomeSource};

/// An outcome source that replays a fixed script.
///
/// - pops one outcome per draw, ignoring the failure rate;
/// - once the script runs out it keeps returning `fallback`;
/// - records every rate it was asked about, for assertions.
#[derive(Debug, Clone)]
pub struct ScriptedOutcomes {
    script: VecDeque<AttemptOutcome>,
    fallback: AttemptOutcome,
    pub draws: Vec<f64>,
}

impl ScriptedOutcomes {
    pub fn new(script: impl IntoIterator<Item = AttemptOutcome>) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback: AttemptOutcome::Success,
            draws: Vec::new(),
        }
    }

    /// `failures` timeouts followed by a success.
    pub fn fail_then_succeed(failures: usize) -> Self {
        Self::new(
            std::iter::repeat_n(AttemptOutcome::Failure(FailureReason::Timeout), failures)
                .chain([AttemptOutcome::Success]),
        )
    }

    /// Every draw fails.
    pub fn always_fail() -> Self {
        Self::new(Vec::<AttemptOutcome>::new()).with_fallback(AttemptOutcome::Failure(FailureReason::Overloaded))
    }

    pub fn with_fallback(mut self, fallback: AttemptOutcome) -> Self {
        self.fallback = fallback;
        self
    }
}

impl OutcomeSource for ScriptedOutcomes {
    fn draw(&mut self, failure_rate: f64) -> AttemptOutcome {
        self.draws.push(failure_rate);
        self.script.pop_front().unwrap_or(self.fallback)
    }
}
