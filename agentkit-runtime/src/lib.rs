#![deny(missing_docs)]
//! The `Runner` — bounded intake queue, lifecycle control, and hand-off
//! to an `agentkit_core::Orchestrator` (§4.1).
//!
//! The Runner is deliberately thin: it owns backpressure, the dispatch
//! worker pool, and the event-level trace/callback pair
//! (`BeforeEventHandling`/`AfterEventHandling`). Per-agent invocation and
//! per-agent hooks (`BeforeAgentRun`/`AfterAgentRun`) belong to whichever
//! `agentkit_orch` orchestrator is wired in, since only the orchestrator
//! knows how many agent calls one event produces.

mod error;
mod runner;

pub use error::RunnerError;
pub use runner::{Runner, RunnerBuilder};
