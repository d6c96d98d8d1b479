//! Agent Skeleton (C7) — the contract an agent implementation fulfills;
//! the dispatcher routes into it.
//!
//! Grounded on the teacher's `AgentExecutor` trait (`execute`/`cancel`
//! against a `RequestContext` + `EventQueue`), narrowed to the spec's four
//! operations (`on_send`/`on_get`/`on_cancel`/`on_subscribe`) and reworked
//! so business logic talks to the task store directly through a
//! [`WorkerHandle`] instead of publishing to a broadcast event queue — the
//! store is now the single place events are produced (see `task_store.rs`),
//! so the skeleton's job is purely translation between an incoming message
//! and a spawned worker, plus catching whatever the worker returns.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::error::{A2AError, A2AResult};
use crate::types::{Artifact, Message, Task, TaskState};

use super::task_store::{TaskListener, TaskStore};

/// What a worker sees of its task: identity, cancellation signal, and the
/// store it reports progress through. Workers never construct SSE events
/// themselves — every mutation here is what produces one.
pub struct WorkerHandle {
    pub task_id: String,
    store: Arc<dyn TaskStore>,
    cancel_token: CancellationToken,
}

impl WorkerHandle {
    /// Whether the task has been canceled since this worker started.
    /// Long-running logic should check this at its suspension points
    /// (spec §5's "ideally raising at suspension points").
    pub fn is_canceled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Resolves once the task is canceled — `select!` this against work in
    /// progress to react promptly rather than polling.
    pub async fn canceled(&self) {
        self.cancel_token.cancelled().await
    }

    pub async fn send_message(&self, message: Message) -> A2AResult<()> {
        self.store.append_message(&self.task_id, message).await
    }

    pub async fn send_artifact(&self, artifact: Artifact) -> A2AResult<()> {
        if !artifact.is_valid() {
            return Err(A2AError::validation(format!(
                "artifact {} must set exactly one of content/uri",
                artifact.id
            )));
        }
        self.store.append_artifact(&self.task_id, artifact).await
    }

    pub async fn mark_input_required(&self) -> A2AResult<()> {
        self.store
            .update_state(&self.task_id, TaskState::InputRequired, None)
            .await
    }

    pub async fn complete(&self) -> A2AResult<()> {
        self.store
            .update_state(&self.task_id, TaskState::Completed, None)
            .await
    }
}

/// Business logic an agent author implements. Everything about the wire
/// protocol, task bookkeeping, and event fan-out is handled by
/// [`AgentSkeleton`]; this trait only sees "a message arrived for this
/// task, go do something with it."
#[async_trait]
pub trait AgentLogic: Send + Sync {
    /// Process one incoming message for `handle.task_id`. Returning `Ok(())`
    /// leaves the task's terminal status up to the implementation (it may
    /// already have called `complete`/left it `INPUT_REQUIRED`); returning
    /// `Err` causes the skeleton to mark the task `FAILED` with a sanitized
    /// version of the error as the status message (spec §4.7).
    async fn handle_message(&self, handle: WorkerHandle, message: Message) -> A2AResult<()>;
}

/// Routes dispatcher calls into a [`TaskStore`] and a caller-supplied
/// [`AgentLogic`], spawning one background worker per new task created
/// through `on_send`.
pub struct AgentSkeleton {
    store: Arc<dyn TaskStore>,
    logic: Arc<dyn AgentLogic>,
}

impl AgentSkeleton {
    pub fn new(store: Arc<dyn TaskStore>, logic: Arc<dyn AgentLogic>) -> Self {
        Self { store, logic }
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }

    /// Creates a new task (if `task_id` is `None`) and spawns a background
    /// worker bound to it, or appends `message` to an existing non-terminal
    /// task without spawning a second worker for it. Returns immediately
    /// with the task's id either way.
    ///
    /// A task only ever has one worker running at a time, and that worker
    /// has already returned by the time a follow-up `tasks/send` lands (it
    /// left the task in `INPUT_REQUIRED`, or it wouldn't be safe to send a
    /// follow-up at all) — so a continuation is recorded, not replayed
    /// through a fresh `AgentLogic::handle_message` call. A task that has
    /// already reached a terminal state rejects the follow-up outright.
    pub async fn on_send(
        &self,
        task_id: Option<String>,
        message: Message,
        webhook_url: Option<String>,
        metadata: Option<Value>,
    ) -> A2AResult<String> {
        match task_id {
            Some(id) => {
                let task = self.store.get_task(&id).await?;
                if task.state.is_terminal() {
                    return Err(A2AError::validation(format!(
                        "task {id} is already {:?}; cannot accept a follow-up message",
                        task.state
                    )));
                }
                self.store.append_message(&id, message).await?;
                Ok(id)
            }
            None => {
                let task = self
                    .store
                    .create_task(message.clone(), webhook_url, metadata)
                    .await?;
                self.spawn_worker(task.task_id.clone(), message).await;
                Ok(task.task_id)
            }
        }
    }

    pub async fn on_get(&self, task_id: &str) -> A2AResult<Task> {
        self.store.get_task(task_id).await
    }

    /// If the task is non-terminal, transition it to `CANCELED` (which
    /// flips the worker's cancellation token) and return `true`; if it's
    /// already terminal, return `false` without touching the store (spec
    /// §4.7 — cancellation after completion is a no-op, not an error).
    pub async fn on_cancel(&self, task_id: &str) -> A2AResult<bool> {
        let task = self.store.get_task(task_id).await?;
        if task.state.is_terminal() {
            return Ok(false);
        }
        self.store
            .update_state(task_id, TaskState::Canceled, None)
            .await?;
        Ok(true)
    }

    /// Registers an event listener with the store for `tasks/sendSubscribe`.
    pub async fn on_subscribe(&self, task_id: &str) -> A2AResult<TaskListener> {
        self.store.add_listener(task_id).await
    }

    async fn spawn_worker(&self, task_id: String, message: Message) {
        let store = self.store.clone();
        let logic = self.logic.clone();

        tokio::spawn(async move {
            let cancel_token = match store.cancellation_token(&task_id).await {
                Ok(token) => token,
                Err(e) => {
                    warn!(task_id = %task_id, error = %e, "worker could not obtain cancellation token, aborting");
                    return;
                }
            };

            // Submitted → Working is the one transition every send performs;
            // a follow-up into an already-Working task is a silent no-op via
            // the store's terminal/duplicate handling — anything else here
            // (e.g. the task already failed under us) we just log and bail,
            // since there is nothing a worker can append to a dead task.
            if let Err(e) = store
                .update_state(&task_id, TaskState::Working, None)
                .await
            {
                if !matches!(e, A2AError::InvalidTransition { .. }) {
                    error!(task_id = %task_id, error = %e, "failed to mark task working");
                    return;
                }
            }

            let handle = WorkerHandle {
                task_id: task_id.clone(),
                store: store.clone(),
                cancel_token,
            };

            if let Err(e) = logic.handle_message(handle, message).await {
                let sanitized = sanitize_worker_error(&e);
                if let Err(report_err) = store
                    .update_state(&task_id, TaskState::Failed, Some(Message::system(sanitized)))
                    .await
                {
                    error!(
                        task_id = %task_id,
                        worker_error = %e,
                        report_error = %report_err,
                        "worker failed and the failure could not be recorded"
                    );
                }
            }
        });
    }
}

/// Worker errors reported to a task's status message must not leak internal
/// detail (spec §4.7's "sanitized"); application-level errors (validation,
/// invalid transitions) are safe to surface as-is, everything else becomes
/// a generic message.
fn sanitize_worker_error(err: &A2AError) -> String {
    match err {
        A2AError::Validation { message } => message.clone(),
        A2AError::InvalidTransition { .. } | A2AError::TaskNotFound { .. } => err.to_string(),
        _ => "agent processing failed".to_string(),
    }
}
