//! Per-logical-target resilience settings (§6.5): one retry policy and
//! one circuit-breaker policy per named external collaborator, plus
//! conversions into the live `agentkit_resilience` wrapper configs.

use agentkit_resilience::{CircuitBreakerConfig as LiveCircuitBreakerConfig, RetryConfig as LiveRetryConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    100
}

fn default_max_delay_ms() -> u64 {
    10_000
}

/// One target's retry policy (`[retry.<target>]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Maximum attempts after the first try.
    pub max_attempts: u32,
    /// Base delay for the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Delay ceiling, in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl RetrySettings {
    /// Build a live [`LiveRetryConfig`] using `agentkit-resilience`'s
    /// default retryable predicate (timeout-like/transient).
    pub fn to_retry_config(&self) -> LiveRetryConfig {
        LiveRetryConfig {
            max_attempts: self.max_attempts,
            base_delay_ms: self.base_delay_ms,
            max_delay_ms: self.max_delay_ms,
            ..LiveRetryConfig::default()
        }
    }
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_success_threshold() -> u32 {
    2
}

fn default_timeout_ms() -> u64 {
    30_000
}

/// One target's circuit-breaker policy (`[circuit_breaker.<target>]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerSettings {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,
    /// Consecutive half-open successes before the circuit closes.
    pub success_threshold: u32,
    /// Milliseconds the circuit stays open before a half-open trial.
    pub timeout_ms: u64,
    /// Concurrent in-flight calls allowed while closed/half-open. `0`
    /// means unbounded.
    pub max_concurrent_calls: usize,
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            success_threshold: default_success_threshold(),
            timeout_ms: default_timeout_ms(),
            max_concurrent_calls: 0,
        }
    }
}

impl CircuitBreakerSettings {
    /// Build a live [`LiveCircuitBreakerConfig`].
    pub fn to_circuit_breaker_config(&self) -> LiveCircuitBreakerConfig {
        LiveCircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            success_threshold: self.success_threshold,
            reset_timeout: Duration::from_millis(self.timeout_ms),
            max_concurrent_calls: if self.max_concurrent_calls == 0 {
                None
            } else {
                Some(self.max_concurrent_calls)
            },
        }
    }
}

/// `[retry.*]` — one [`RetrySettings`] per logical target name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetryTargets(pub HashMap<String, RetrySettings>);

impl RetryTargets {
    pub(crate) fn merge(&mut self, other: Self) {
        self.0.extend(other.0);
    }
}

/// `[circuit_breaker.*]` — one [`CircuitBreakerSettings`] per logical
/// target name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CircuitBreakerTargets(pub HashMap<String, CircuitBreakerSettings>);

impl CircuitBreakerTargets {
    pub(crate) fn merge(&mut self, other: Self) {
        self.0.extend(other.0);
    }
}
