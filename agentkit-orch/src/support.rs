//! Shared agent-invocation plumbing used by every orchestrator: fires
//! `BeforeAgentRun`/`AfterAgentRun` callbacks and trace entries around
//! one [`AgentHandler`] call.
//!
//! Only the orchestrator knows how many agent calls one event produces
//! (one for route, N for collaborative, ...), so these hooks live here
//! rather than in the Runner, which only fires the event-level pair.

use agentkit_callback::CallbackRegistry;
use agentkit_core::{AgentError, AgentHandler, AgentResult, Event, HookContext, HookPoint, State};
use agentkit_trace::TraceLogger;
use std::sync::Arc;

/// Invoke `agent` for `event`/`state`, firing `BeforeAgentRun` and
/// `AfterAgentRun` callbacks and trace entries around the call.
///
/// The state threaded into the agent is whatever `BeforeAgentRun`
/// subscribers produce; the state reported onward (and embedded in the
/// returned [`AgentResult`] on success) is whatever `AfterAgentRun`
/// subscribers produce from the agent's own output.
pub(crate) async fn invoke_agent(
    agent_id: &str,
    agent: &Arc<dyn AgentHandler>,
    event: &Event,
    state: &State,
    callbacks: &CallbackRegistry,
    trace: &dyn TraceLogger,
) -> Result<AgentResult, AgentError> {
    let session_id = event.session_id().unwrap_or_default().to_string();
    let event_id = event.id().as_str().to_string();

    let before_ctx = HookContext {
        point: HookPoint::BeforeAgentRun,
        session_id: &session_id,
        event_id: &event_id,
        agent_id: Some(agent_id),
    };
    let run_state = callbacks.dispatch(&before_ctx, state.clone()).await;
    let _ = trace
        .append(agentkit_core::TraceEntry::for_agent(
            HookPoint::BeforeAgentRun,
            session_id.clone(),
            event_id.clone(),
            agent_id,
            run_state.snapshot(),
        ))
        .await;

    let result = agent.run(event, &run_state).await;

    let after_ctx = HookContext {
        point: HookPoint::AfterAgentRun,
        session_id: &session_id,
        event_id: &event_id,
        agent_id: Some(agent_id),
    };

    match result {
        Ok(mut agent_result) => {
            agent_result.output = callbacks.dispatch(&after_ctx, agent_result.output).await;
            let _ = trace
                .append(
                    agentkit_core::TraceEntry::for_agent(
                        HookPoint::AfterAgentRun,
                        session_id,
                        event_id,
                        agent_id,
                        agent_result.output.snapshot(),
                    )
                    .with_result(agent_result.clone()),
                )
                .await;
            Ok(agent_result)
        }
        Err(err) => {
            let _ = callbacks.dispatch(&after_ctx, run_state.clone()).await;
            let critical = err.kind() == agentkit_core::ErrorKind::Critical;
            let _ = trace
                .append(
                    agentkit_core::TraceEntry::for_agent(
                        HookPoint::AfterAgentRun,
                        session_id,
                        event_id,
                        agent_id,
                        run_state.snapshot(),
                    )
                    .with_error(err.to_string(), critical),
                )
                .await;
            Err(err)
        }
    }
}
