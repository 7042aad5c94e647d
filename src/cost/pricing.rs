// src/cost/pricing.rs

//! Token pricing and token estimation.

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign};

use crate::types::TokenKind;

/// Default price of one million input tokens, in USD.
pub const DEFAULT_INPUT_PER_MILLION: f64 = 3.0;
/// Default price of one million output tokens, in USD.
pub const DEFAULT_OUTPUT_PER_MILLION: f64 = 15.0;
/// Default characters-per-token ratio for estimation.
pub const DEFAULT_CHARS_PER_TOKEN: f64 = 4.0;

/// Token counts split by kind. Arithmetic saturates at `u64::MAX`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
}

impl TokenUsage {
    pub fn new(input: u64, output: u64) -> Self {
        Self { input, output }
    }

    pub fn total(&self) -> u64 {
        self.input.saturating_add(self.output)
    }

    pub fn of(&self, kind: TokenKind) -> u64 {
        match kind {
            TokenKind::Input => self.input,
            TokenKind::Output => self.output,
        }
    }

    /// This usage repeated `times` times.
    pub fn times(self, times: u64) -> Self {
        Self {
            input: self.input.saturating_mul(times),
            output: self.output.saturating_mul(times),
        }
    }
}

impl Add for TokenUsage {
    type Output = TokenUsage;

    fn add(self, rhs: Self) -> Self::Output {
        TokenUsage {
            input: self.input.saturating_add(rhs.input),
            output: self.output.saturating_add(rhs.output),
        }
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Price per token kind, in USD per million tokens.
///
/// Kinds without a configured price are free.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingModel {
    per_million: BTreeMap<TokenKind, f64>,
}

impl PricingModel {
    pub fn new(input_per_million: f64, output_per_million: f64) -> Self {
        Self::free()
            .with_price(TokenKind::Input, input_per_million)
            .with_price(TokenKind::Output, output_per_million)
    }

    /// A model where every token costs nothing.
    pub fn free() -> Self {
        Self {
            per_million: BTreeMap::new(),
        }
    }

    pub fn with_price(mut self, kind: TokenKind, usd_per_million: f64) -> Self {
        self.per_million.insert(kind, usd_per_million);
        self
    }

    pub fn price_per_million(&self, kind: TokenKind) -> f64 {
        self.per_million.get(&kind).copied().unwrap_or(0.0)
    }

    /// Dollar cost of `usage`.
    pub fn cost_of(&self, usage: TokenUsage) -> f64 {
        [TokenKind::Input, TokenKind::Output]
            .into_iter()
            .map(|kind| usage.of(kind) as f64 * self.price_per_million(kind) / 1_000_000.0)
            .sum()
    }
}

impl Default for PricingModel {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_PER_MILLION, DEFAULT_OUTPUT_PER_MILLION)
    }
}

/// How token counts are derived from raw text when a scenario does not
/// state them explicitly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenEstimationConfig {
    pub chars_per_token: f64,
}

impl TokenEstimationConfig {
    /// Estimated token count of `text`: characters divided by the ratio,
    /// rounded up. Empty text is zero tokens.
    pub fn estimate(&self, text: &str) -> u64 {
        let chars = text.chars().count();
        if chars == 0 {
            return 0;
        }
        (chars as f64 / self.chars_per_token).ceil() as u64
    }
}

impl Default for TokenEstimationConfig {
    fn default() -> Self {
        Self {
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
        }
    }
}
