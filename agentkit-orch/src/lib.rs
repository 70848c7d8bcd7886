#![deny(missing_docs)]
//! The five orchestration disciplines for the AgenticGoKit runtime.
//!
//! Every type here implements `agentkit_core::Orchestrator`: given an
//! event and its initial state, decide how many agents run, in what
//! order or concurrency, and how their outputs combine.
//!
//! | Orchestrator | Discipline |
//! |---|---|
//! | [`RouteOrchestrator`] | one agent, re-dispatch via the agent's own output metadata |
//! | [`CollaborativeOrchestrator`] | fan-out/fan-in, configurable failure policy |
//! | [`SequentialOrchestrator`] | fixed ordered chain |
//! | [`LoopOrchestrator`] | repeat one agent until convergence/cap/deadline |
//! | [`MixedOrchestrator`] | a collaborative phase then a sequential phase |

mod collaborative;
mod loop_orch;
mod mixed;
mod route;
mod sequential;
mod support;

pub use collaborative::{CollaborativeOrchestrator, FailurePolicy};
pub use loop_orch::{LoopOrchestrator, StopReason};
pub use mixed::MixedOrchestrator;
pub use route::RouteOrchestrator;
pub use sequential::SequentialOrchestrator;
