// src/cost/mod.rs

//! Cost and latency model for execution strategies.
//!
//! - [`pricing`] holds the per-token-kind price table and text-to-token
//!   estimation.
//! - [`evaluator`] scores a scenario under the sequential, parallel and
//!   staged strategies.

pub mod evaluator;
pub mod pricing;

pub use evaluator::{compare, evaluate, latency, CostResult, StrategyComparison, BASELINE};
pub use pricing::{PricingModel, TokenEstimationConfig, TokenUsage};
