//! # agentkit-core — protocol types for the AgenticGoKit runtime
//!
//! This crate defines the data model and the two trait boundaries every
//! other `agentkit-*` crate builds on.
//!
//! | Type | What it is |
//! |------|------------|
//! | [`State`] | The opaque data/metadata map threaded through one event's handling |
//! | [`Event`] | The immutable unit of work delivered to the system |
//! | [`AgentHandler`] | The one operation orchestrators invoke |
//! | [`AgentResult`] | What a handler returns from one invocation |
//! | [`Orchestrator`] | How agents compose for one event (`agentkit-orch`) |
//! | [`Callback`] | A named subscriber at a fixed [`HookPoint`] (`agentkit-callback`) |
//! | [`TraceEntry`] | One row in a session's execution timeline (`agentkit-trace`) |
//! | [`ErrorKind`] | The closed taxonomy every crate's errors classify into |
//!
//! ## Design Principle
//!
//! State and Event data are opaque `serde_json::Value` payloads — this
//! crate never reflects over their shape. Typed access happens at the
//! system's edges, not in the core.

#![deny(missing_docs)]

pub mod agent;
pub mod duration;
pub mod error;
pub mod event;
pub mod hook;
pub mod id;
pub mod orchestrator;
pub mod state;
pub(crate) mod systime;
pub mod trace;

pub use agent::{AgentHandler, AgentResult, ConvergenceHint};
pub use duration::DurationMs;
pub use error::{AgentError, ErrorKind};
pub use event::Event;
pub use hook::{Callback, CallbackError, HookContext, HookPoint};
pub use id::{new_event_id, AgentId, EventId, SessionId};
pub use orchestrator::{OrchError, Orchestrator, OrchestratorOutcome};
pub use state::{DefaultMergeResolver, MergeResolver, State};
pub use trace::{StateSnapshot, TraceEntry};
