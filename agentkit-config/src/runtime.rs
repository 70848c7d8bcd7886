//! Runtime-level knobs: intake queue size, dispatch worker count, and
//! the default per-agent timeout.

use serde::{Deserialize, Serialize};

fn default_max_concurrent_agents() -> usize {
    16
}

fn default_queue_size() -> usize {
    1024
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_dispatch_workers() -> usize {
    1
}

/// `[runtime]` — §6.5's `max_concurrent_agents`, `queue_size`,
/// `timeout_seconds`, `dispatch_workers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Upper bound on agents running concurrently across all fan-out
    /// orchestrators, absent a per-orchestrator `max_concurrency`.
    pub max_concurrent_agents: usize,
    /// Bounded intake queue capacity. `0` means every `Emit` fails with
    /// `QueueFull` (§8 boundary behavior).
    pub queue_size: usize,
    /// Default per-agent-invocation timeout, used when a caller doesn't
    /// wrap an agent in its own `Timeout` decorator.
    pub timeout_seconds: u64,
    /// Number of dispatch worker tasks draining the intake queue.
    pub dispatch_workers: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_concurrent_agents: default_max_concurrent_agents(),
            queue_size: default_queue_size(),
            timeout_seconds: default_timeout_seconds(),
            dispatch_workers: default_dispatch_workers(),
        }
    }
}

impl RuntimeConfig {
    pub(crate) fn merge(&mut self, other: Self) {
        *self = other;
    }
}
