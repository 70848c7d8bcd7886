//! `[orchestration]` — which of the five disciplines (§4.2) the Runner's
//! default orchestrator uses, and the knobs each discipline reads.

use serde::{Deserialize, Serialize};

/// Which scheduling discipline to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestrationMode {
    /// §4.2.1 — single-target with re-route.
    Route,
    /// §4.2.2 — fan-out/fan-in.
    Collaborative,
    /// §4.2.3 — fixed ordered chain.
    Sequential,
    /// §4.2.4 — bounded iteration over one agent.
    Loop,
    /// §4.2.5 — parallel phase then sequential phase.
    Mixed,
}

impl Default for OrchestrationMode {
    fn default() -> Self {
        OrchestrationMode::Route
    }
}

fn default_failure_threshold() -> f64 {
    1.0
}

/// `[orchestration]` table. Not every field applies to every mode — a
/// `Route` config ignores `sequential_agents`, for example — but all
/// fields are always present so a TOML file can be hand-edited to
/// switch `mode` without restructuring the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestrationConfig {
    /// Which discipline to construct.
    pub mode: OrchestrationMode,
    /// Upper bound on concurrent agent invocations within one
    /// collaborative/mixed-phase-1 fan-out. `0` means unbounded.
    pub max_concurrency: usize,
    /// Collaborative failure policy threshold. `1.0` (or any value
    /// `>= agent count`) behaves like `FailurePolicy::All`; a value `< 1`
    /// selects `FailurePolicy::Any`; an integer-valued threshold between
    /// the two selects `FailurePolicy::Threshold(n)`.
    pub failure_threshold: f64,
    /// Ordered agent names for `Sequential` (and mixed phase 2).
    pub sequential_agents: Vec<String>,
    /// Whether the sequential chain continues past a failing step.
    pub continue_on_error: bool,
    /// The agent name `Loop` repeatedly invokes.
    pub loop_agent: Option<String>,
    /// Maximum loop iterations before stopping with `max_iterations`.
    pub loop_max_iterations: u32,
    /// State data key the loop orchestrator's default stop predicate
    /// reads for convergence (truthy value ⇒ converged).
    pub loop_stop_key: Option<String>,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            mode: OrchestrationMode::default(),
            max_concurrency: 0,
            failure_threshold: default_failure_threshold(),
            sequential_agents: Vec::new(),
            continue_on_error: false,
            loop_agent: None,
            loop_max_iterations: 10,
            loop_stop_key: None,
        }
    }
}

impl OrchestrationConfig {
    pub(crate) fn merge(&mut self, other: Self) {
        *self = other;
    }

    /// Resolve `max_concurrency` into the `Option<usize>` the
    /// orchestrator constructors expect (`0` ⇒ unbounded).
    pub fn max_concurrency(&self) -> Option<usize> {
        if self.max_concurrency == 0 {
            None
        } else {
            Some(self.max_concurrency)
        }
    }
}
