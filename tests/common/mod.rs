#![allow(dead_code)]

pub use dagsim_test_utils::builders::{ScenarioBuilder, TaskBuilder};
pub use dagsim_test_utils::init_tracing;

use dagsim::dag::Scenario;

/// `A(2)`, then `B(3)` and `C(1)` both after `A`.
pub fn fan_out() -> Scenario {
    ScenarioBuilder::new("fan-out")
        .task("A", 2, &[])
        .task("B", 3, &["A"])
        .task("C", 1, &["A"])
        .build()
}

/// Two components:
/// - `A(1)`, then `B(4)` and `C(1)` after `A`, then `D(1)` after `C`;
/// - `X(2)`, then `Y(2)` after `X`.
///
/// `D` is ready long before `B` finishes, so wave gating delays it.
pub fn staggered() -> Scenario {
    ScenarioBuilder::new("staggered")
        .task("A", 1, &[])
        .task("B", 4, &["A"])
        .task("C", 1, &["A"])
        .task("D", 1, &["C"])
        .task("X", 2, &[])
        .task("Y", 2, &["X"])
        .build()
}
