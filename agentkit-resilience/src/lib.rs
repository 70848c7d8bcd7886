#![deny(missing_docs)]
//! Resilience decorators for [`agentkit_core::AgentHandler`].
//!
//! `Timeout`, `Retry`, and `CircuitBreaker` all wrap `Arc<dyn
//! AgentHandler>` and themselves implement `AgentHandler`, so they
//! compose as plain decorators:
//!
//! ```ignore
//! let resilient = CircuitBreaker::new(
//!     Arc::new(Retry::new(
//!         Arc::new(Timeout::new(agent, Duration::from_secs(5))),
//!         RetryConfig::default(),
//!     )),
//!     CircuitBreakerConfig::default(),
//! );
//! ```

pub mod circuit_breaker;
pub mod error;
pub mod inspector;
pub mod retry;
pub mod timeout;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use error::ResilienceError;
pub use inspector::{AgentInspector, InspectorStats};
pub use retry::{Retry, RetryConfig};
pub use timeout::Timeout;
