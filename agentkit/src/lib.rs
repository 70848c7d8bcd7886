#![deny(missing_docs)]
//! # agentkit — umbrella crate
//!
//! A single import surface for the AgenticGoKit multi-agent runtime core.
//! Re-exports the `agentkit-*` protocol, callback, trace, resilience,
//! orchestration, runtime, and configuration crates behind feature flags,
//! plus a `prelude` for the happy path.

#[cfg(feature = "callback")]
pub use agentkit_callback;
#[cfg(feature = "config")]
pub use agentkit_config;
#[cfg(feature = "core")]
pub use agentkit_core;
#[cfg(feature = "orch")]
pub use agentkit_orch;
#[cfg(feature = "resilience")]
pub use agentkit_resilience;
#[cfg(feature = "runtime")]
pub use agentkit_runtime;
#[cfg(feature = "trace")]
pub use agentkit_trace;

/// Happy-path imports for wiring an agentkit runtime.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use agentkit_core::{
        AgentError, AgentHandler, AgentResult, Callback, CallbackError, ConvergenceHint,
        DurationMs, ErrorKind, Event, HookContext, HookPoint, OrchError, Orchestrator,
        OrchestratorOutcome, State,
    };
    #[cfg(feature = "core")]
    pub use agentkit_core::{AgentId, EventId, SessionId};
    #[cfg(feature = "core")]
    pub use agentkit_core::TraceEntry;

    #[cfg(feature = "callback")]
    pub use agentkit_callback::CallbackRegistry;

    #[cfg(feature = "trace")]
    pub use agentkit_trace::{FileTraceLogger, InMemoryTraceLogger, TraceLogger};

    #[cfg(feature = "resilience")]
    pub use agentkit_resilience::{
        AgentInspector, CircuitBreaker, CircuitBreakerConfig, CircuitState, InspectorStats,
        ResilienceError, Retry, RetryConfig, Timeout,
    };

    #[cfg(feature = "orch")]
    pub use agentkit_orch::{
        CollaborativeOrchestrator, FailurePolicy, LoopOrchestrator, MixedOrchestrator,
        RouteOrchestrator, SequentialOrchestrator, StopReason,
    };

    #[cfg(feature = "runtime")]
    pub use agentkit_runtime::{Runner, RunnerBuilder, RunnerError};

    #[cfg(feature = "config")]
    pub use agentkit_config::Config;
}
