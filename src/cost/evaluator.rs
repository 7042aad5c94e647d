// src/cost/evaluator.rs

use std::collections::HashMap;

use tracing::debug;

use crate::cost::pricing::{PricingModel, TokenUsage};
use crate::dag::scenario::Scenario;
use crate::types::{SimTime, Strategy};

/// Strategy every [`CostResult::speedup_vs_baseline`] is measured against.
pub const BASELINE: Strategy = Strategy::Sequential;

/// Score of one strategy on one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct CostResult {
    pub strategy: Strategy,
    /// Dollar cost of every token spent, overhead included.
    pub total_cost: f64,
    /// Makespan under this strategy.
    pub total_latency: SimTime,
    pub tokens: TokenUsage,
    /// Orchestration waves (0 unless the strategy batches work).
    pub waves: usize,
    /// Baseline latency divided by this latency (1.0 when both are zero).
    pub speedup_vs_baseline: f64,
}

/// All strategies scored side by side.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyComparison {
    pub baseline: Strategy,
    pub results: Vec<CostResult>,
}

impl StrategyComparison {
    pub fn get(&self, strategy: Strategy) -> Option<&CostResult> {
        self.results.iter().find(|r| r.strategy == strategy)
    }

    /// Lowest-latency strategy; earlier strategies win ties.
    pub fn fastest(&self) -> Option<&CostResult> {
        self.results
            .iter()
            .reduce(|best, r| if r.total_latency < best.total_latency { r } else { best })
    }

    /// Lowest-cost strategy; earlier strategies win ties.
    pub fn cheapest(&self) -> Option<&CostResult> {
        self.results
            .iter()
            .reduce(|best, r| if r.total_cost < best.total_cost { r } else { best })
    }
}

/// Score `scenario` under `strategy`.
///
/// Cost is the same for every strategy except `Staged`, which additionally
/// pays the scenario's per-wave coordination overhead.
pub fn evaluate(scenario: &Scenario, strategy: Strategy, pricing: &PricingModel) -> CostResult {
    let base = base_usage(scenario);
    let (latency, waves, tokens) = match strategy {
        Strategy::Sequential => (sequential_latency(scenario), 0, base),
        Strategy::Parallel => (parallel_latency(scenario), 0, base),
        Strategy::Staged => {
            let staged = staged_plan(scenario);
            let overhead = scenario.overhead();
            let per_wave = TokenUsage::new(
                overhead.staged_input_tokens_per_wave,
                overhead.staged_output_tokens_per_wave,
            );
            (
                staged.latency,
                staged.waves,
                base + per_wave.times(staged.waves as u64),
            )
        }
    };

    let baseline = sequential_latency(scenario);
    let speedup = if latency == 0 {
        1.0
    } else {
        baseline as f64 / latency as f64
    };

    let result = CostResult {
        strategy,
        total_cost: pricing.cost_of(tokens),
        total_latency: latency,
        tokens,
        waves,
        speedup_vs_baseline: speedup,
    };

    debug!(
        scenario = %scenario.name(),
        %strategy,
        latency = result.total_latency,
        cost = result.total_cost,
        waves = result.waves,
        "strategy evaluated"
    );

    result
}

/// Score every strategy against the sequential baseline.
pub fn compare(scenario: &Scenario, pricing: &PricingModel) -> StrategyComparison {
    StrategyComparison {
        baseline: BASELINE,
        results: Strategy::ALL
            .into_iter()
            .map(|s| evaluate(scenario, s, pricing))
            .collect(),
    }
}

/// Makespan of `scenario` under `strategy`, without pricing.
pub fn latency(scenario: &Scenario, strategy: Strategy) -> SimTime {
    match strategy {
        Strategy::Sequential => sequential_latency(scenario),
        Strategy::Parallel => parallel_latency(scenario),
        Strategy::Staged => staged_plan(scenario).latency,
    }
}

fn base_usage(scenario: &Scenario) -> TokenUsage {
    scenario
        .tasks()
        .iter()
        .map(|t| TokenUsage::new(t.input_tokens, t.output_tokens))
        .fold(TokenUsage::default(), |acc, u| acc + u)
}

fn sequential_latency(scenario: &Scenario) -> SimTime {
    scenario.total_duration()
}

fn parallel_latency(scenario: &Scenario) -> SimTime {
    scenario.critical_path().length
}

struct StagedPlan {
    latency: SimTime,
    waves: usize,
}

/// Each connected component advances through its own waves; a wave lasts as
/// long as its slowest task. Components overlap, so the scenario takes as
/// long as its slowest component.
fn staged_plan(scenario: &Scenario) -> StagedPlan {
    let graph = scenario.graph();
    let mut wave_max: HashMap<(usize, usize), SimTime> = HashMap::new();

    for (i, task) in scenario.tasks().iter().enumerate() {
        let slot = wave_max
            .entry((graph.component_of(i), graph.wave_of(i)))
            .or_insert(0);
        *slot = (*slot).max(task.duration);
    }

    let mut per_component = vec![0 as SimTime; graph.component_count()];
    for ((component, _), longest) in &wave_max {
        per_component[*component] = per_component[*component].saturating_add(*longest);
    }

    StagedPlan {
        latency: per_component.into_iter().max().unwrap_or(0),
        waves: wave_max.len(),
    }
}
