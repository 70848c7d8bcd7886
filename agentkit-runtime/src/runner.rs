//! The Runner: bounded intake queue, lifecycle, and hand-off to an
//! orchestrator (§4.1).

use crate::error::RunnerError;
use agentkit_callback::CallbackRegistry;
use agentkit_core::state::META_SESSION_ID;
use agentkit_core::{AgentHandler, Event, HookContext, HookPoint, Orchestrator, SessionId, TraceEntry};
use agentkit_trace::{InMemoryTraceLogger, TraceLogger};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Shared, cloneable context a dispatch worker needs to process one
/// event — everything a [`Runner`] owns except the receiver and its own
/// lifecycle bookkeeping.
#[derive(Clone)]
struct DispatchContext {
    orchestrator: Arc<dyn Orchestrator>,
    callbacks: Arc<CallbackRegistry>,
    trace: Arc<dyn TraceLogger>,
    sender: mpsc::Sender<Event>,
}

/// Fill a missing `session_id`, claim a queue slot, record the
/// `BeforeEventHandling` trace entry, then hand the event off.
///
/// The slot is claimed with `reserve`/`try_reserve` *before* the trace
/// entry is appended and the event is actually sent, so the event can
/// never become visible to a dispatch worker before its
/// `BeforeEventHandling` entry exists — otherwise a worker on another
/// thread could dequeue and finish the event (appending
/// `AfterEventHandling`) before this task reaches its own `append`,
/// producing an out-of-order trace (§8). An event that fails to claim a
/// slot never gets a trace entry, satisfying the "exactly one per
/// successfully intaken event" invariant (§4.1).
async fn intake(ctx: &DispatchContext, mut event: Event, blocking: bool) -> Result<(), RunnerError> {
    if event.session_id().is_none() {
        let session_id = event.id().as_str().to_string();
        event.set_meta(META_SESSION_ID, session_id);
    }

    let permit = if blocking {
        // Internal re-dispatch (route follow-ups): respect backpressure
        // by waiting rather than dropping a chain mid-trajectory.
        ctx.sender.reserve().await.map_err(|_| RunnerError::QueueFull)?
    } else {
        ctx.sender.try_reserve().map_err(|_| RunnerError::QueueFull)?
    };

    let session_id = event.session_id().unwrap_or_default().to_string();
    let event_id = event.id().as_str().to_string();
    let snapshot = event.into_state().snapshot();
    let _ = ctx
        .trace
        .append(TraceEntry::for_event(
            HookPoint::BeforeEventHandling,
            session_id,
            event_id,
            snapshot,
        ))
        .await;

    permit.send(event);
    Ok(())
}

async fn process_event(ctx: DispatchContext, event: Event) {
    let session_id = event.session_id().unwrap_or_default().to_string();
    let event_id = event.id().as_str().to_string();

    let before_ctx = HookContext {
        point: HookPoint::BeforeEventHandling,
        session_id: &session_id,
        event_id: &event_id,
        agent_id: None,
    };
    let initial_state = ctx.callbacks.dispatch(&before_ctx, event.into_state()).await;
    let pre_dispatch_snapshot = initial_state.snapshot();

    match ctx.orchestrator.dispatch(&event, initial_state).await {
        Ok(outcome) => {
            let after_ctx = HookContext {
                point: HookPoint::AfterEventHandling,
                session_id: &session_id,
                event_id: &event_id,
                agent_id: None,
            };
            let final_state = ctx.callbacks.dispatch(&after_ctx, outcome.state).await;
            let _ = ctx
                .trace
                .append(TraceEntry::for_event(
                    HookPoint::AfterEventHandling,
                    session_id,
                    event_id,
                    final_state.snapshot(),
                ))
                .await;

            if let Some(followup) = outcome.followup {
                if intake(&ctx, followup, true).await.is_err() {
                    tracing::warn!("dropped route follow-up event: intake queue closed");
                }
            }
        }
        Err(err) => {
            let kind = err.kind();
            let critical = kind == agentkit_core::ErrorKind::Critical;
            let _ = ctx
                .trace
                .append(
                    TraceEntry::for_event(
                        HookPoint::AfterEventHandling,
                        session_id,
                        event_id,
                        pre_dispatch_snapshot,
                    )
                    .with_error(err.to_string(), critical),
                )
                .await;
        }
    }
}

/// Builds a [`Runner`]. Agents registered here are the Runner's own
/// read-only-after-start bookkeeping (§5) — the orchestrator supplied to
/// [`RunnerBuilder::new`] is expected to already have these same
/// handlers wired into its own dispatch policy; the Runner does not
/// invoke agents itself.
pub struct RunnerBuilder {
    agents: HashMap<String, Arc<dyn AgentHandler>>,
    orchestrator: Arc<dyn Orchestrator>,
    callbacks: Arc<CallbackRegistry>,
    trace: Arc<dyn TraceLogger>,
    queue_size: usize,
    dispatch_workers: usize,
}

impl RunnerBuilder {
    /// Start building a runner around `orchestrator`. Defaults: a fresh
    /// `CallbackRegistry`, an `InMemoryTraceLogger`, a 1024-deep queue,
    /// and a single dispatch worker.
    pub fn new(orchestrator: Arc<dyn Orchestrator>) -> Self {
        Self {
            agents: HashMap::new(),
            orchestrator,
            callbacks: Arc::new(CallbackRegistry::new()),
            trace: Arc::new(InMemoryTraceLogger::new()),
            queue_size: 1024,
            dispatch_workers: 1,
        }
    }

    /// Register an agent under `name` in the Runner's own bookkeeping
    /// map.
    pub fn register_agent(mut self, name: impl Into<String>, agent: Arc<dyn AgentHandler>) -> Self {
        self.agents.insert(name.into(), agent);
        self
    }

    /// Replace the default `CallbackRegistry`.
    pub fn callbacks(mut self, callbacks: Arc<CallbackRegistry>) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Replace the default `InMemoryTraceLogger`.
    pub fn trace(mut self, trace: Arc<dyn TraceLogger>) -> Self {
        self.trace = trace;
        self
    }

    /// Set the bounded intake queue's capacity. `0` means every `emit`
    /// fails with `QueueFull`.
    pub fn queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = queue_size;
        self
    }

    /// Set the number of dispatch worker tasks draining the intake
    /// queue.
    pub fn dispatch_workers(mut self, dispatch_workers: usize) -> Self {
        self.dispatch_workers = dispatch_workers.max(1);
        self
    }

    /// Build the runner. Does not start it — call [`Runner::start`].
    pub fn build(self) -> Runner {
        let (sender, receiver) = mpsc::channel(self.queue_size.max(1));
        Runner {
            agents: self.agents,
            orchestrator: self.orchestrator,
            callbacks: self.callbacks,
            trace: self.trace,
            sender,
            receiver: Arc::new(AsyncMutex::new(receiver)),
            cancellation: CancellationToken::new(),
            started: AtomicBool::new(false),
            dispatch_workers: self.dispatch_workers,
            worker_handles: AsyncMutex::new(Vec::new()),
        }
    }
}

/// Accepts events, enforces backpressure, hands each event to the
/// orchestrator, fires trace hooks around dispatch, and provides
/// lifecycle control and trace retrieval (§4.1).
pub struct Runner {
    agents: HashMap<String, Arc<dyn AgentHandler>>,
    orchestrator: Arc<dyn Orchestrator>,
    callbacks: Arc<CallbackRegistry>,
    trace: Arc<dyn TraceLogger>,
    sender: mpsc::Sender<Event>,
    receiver: Arc<AsyncMutex<mpsc::Receiver<Event>>>,
    cancellation: CancellationToken,
    started: AtomicBool,
    dispatch_workers: usize,
    worker_handles: AsyncMutex<Vec<JoinHandle<()>>>,
}

impl Runner {
    /// Start building a runner around `orchestrator`.
    pub fn builder(orchestrator: Arc<dyn Orchestrator>) -> RunnerBuilder {
        RunnerBuilder::new(orchestrator)
    }

    /// The names of agents registered in this Runner's own bookkeeping
    /// map (read-only after `start` per §5, though nothing currently
    /// enforces that beyond there being no post-build mutator).
    pub fn agent_names(&self) -> Vec<&str> {
        self.agents.keys().map(String::as_str).collect()
    }

    /// Idempotent. Spawns `dispatch_workers` tasks draining the intake
    /// queue until `stop` cancels the root token.
    pub fn start(&self) -> Result<(), RunnerError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(RunnerError::AlreadyStarted);
        }

        let ctx = DispatchContext {
            orchestrator: self.orchestrator.clone(),
            callbacks: self.callbacks.clone(),
            trace: self.trace.clone(),
            sender: self.sender.clone(),
        };

        let mut handles = Vec::with_capacity(self.dispatch_workers);
        for _ in 0..self.dispatch_workers {
            let ctx = ctx.clone();
            let receiver = self.receiver.clone();
            let cancellation = self.cancellation.clone();
            handles.push(tokio::spawn(async move {
                loop {
                    let event = tokio::select! {
                        _ = cancellation.cancelled() => break,
                        event = async { receiver.lock().await.recv().await } => match event {
                            Some(event) => event,
                            None => break,
                        },
                    };

                    // Isolate a panicking orchestrator/agent from the
                    // worker loop itself (§4.1: "does not crash the
                    // dispatch worker").
                    let task_ctx = ctx.clone();
                    if tokio::spawn(async move { process_event(task_ctx, event).await })
                        .await
                        .is_err()
                    {
                        tracing::error!("dispatch task panicked; continuing");
                    }
                }
            }));
        }

        // `worker_handles` is only ever written here, under `started`'s
        // exclusive first-writer guarantee, so a blocking `try_lock`
        // always succeeds.
        *self
            .worker_handles
            .try_lock()
            .expect("worker_handles only written once, during start") = handles;
        Ok(())
    }

    /// Non-blocking attempt to enqueue. Fills a missing `session_id`,
    /// stamps intake, and records `BeforeEventHandling` on success.
    pub async fn emit(&self, event: Event) -> Result<(), RunnerError> {
        if !self.started.load(Ordering::SeqCst) {
            return Err(RunnerError::NotStarted);
        }
        let ctx = DispatchContext {
            orchestrator: self.orchestrator.clone(),
            callbacks: self.callbacks.clone(),
            trace: self.trace.clone(),
            sender: self.sender.clone(),
        };
        intake(&ctx, event, false).await
    }

    /// Cancels the root cancellation token and awaits the dispatch
    /// workers up to `timeout`. Idempotent: calling this on an
    /// already-stopped (or never-started) runner is a no-op.
    pub async fn stop(&self, timeout: Duration) {
        self.cancellation.cancel();
        let mut handles = self.worker_handles.lock().await;
        let joins = std::mem::take(&mut *handles);
        let _ = tokio::time::timeout(timeout, join_all(joins)).await;
    }

    /// The chronologically ordered trace entries for `session`; an empty
    /// vec if unknown or if the trace logger itself errored.
    pub async fn dump_trace(&self, session: &SessionId) -> Vec<TraceEntry> {
        self.trace.dump(session).await.unwrap_or_default()
    }

    /// Register a callback subscriber, delegating to the
    /// `CallbackRegistry`.
    pub async fn register_callback(
        &self,
        point: HookPoint,
        name: impl Into<String>,
        callback: Arc<dyn agentkit_core::Callback>,
    ) {
        self.callbacks.register(point, name, callback).await;
    }

    /// Unregister a callback subscriber, delegating to the
    /// `CallbackRegistry`.
    pub async fn unregister_callback(&self, point: HookPoint, name: &str) {
        self.callbacks.unregister(point, name).await;
    }
}

async fn join_all(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        let _ = handle.await;
    }
}
