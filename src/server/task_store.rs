//! Task Store (C6) — the server's task state machine, history, and listener
//! fan-out.
//!
//! Grounded on the teacher's `InMemoryTaskStore` (`HashMap` behind a
//! `tokio::sync::RwLock`, `save`/`get`/`delete`/`list` shape), reworked
//! around the spec's narrower operation set (create/get/append/transition)
//! and a listener mechanism the teacher doesn't have an analog for: the
//! teacher fans events out through a `tokio::sync::broadcast::Sender`
//! (`server/event_queue.rs`), which drops events on `Lagged` and gives late
//! subscribers nothing. Spec §4.6 requires exactly-once, in-order delivery
//! per task and a synthetic status snapshot for subscribers that join after
//! some history has happened, which a lossy broadcast channel cannot give.
//! Each task instead gets its own set of per-listener bounded
//! `tokio::sync::mpsc` queues, registered and drained under the same
//! per-task `tokio::sync::Mutex` that serializes every mutation — so a
//! listener can never observe events out of the order the mutations
//! actually happened in, and a snapshot taken under that same lock is
//! always consistent with what gets queued next.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{A2AError, A2AResult};
use crate::types::{
    A2AEvent, Artifact, Message, Task, TaskArtifactUpdateEvent, TaskMessageEvent, TaskState,
    TaskStatusUpdateEvent,
};
use crate::utils::constants::DEFAULT_LISTENER_CAPACITY;

/// A registered subscription on a task's event stream, returned by
/// [`TaskStore::add_listener`]. The first item read off `receiver` is
/// always a synthetic [`A2AEvent::TaskStatusUpdate`] reflecting the task's
/// state at the moment of registration (spec §4.6's "late subscriber"
/// guarantee) — real-time events follow after that.
pub struct TaskListener {
    pub id: u64,
    pub receiver: mpsc::Receiver<A2AEvent>,
}

/// Trait for persisting A2A tasks and fanning their events out to
/// listeners.
///
/// Every mutating method is serialized per task: two concurrent calls
/// touching the same `task_id` observe each other's effects in some
/// definite order, never interleaved (spec §5's per-task serialization
/// requirement). Calls on different `task_id`s never block one another.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Create a new task in `SUBMITTED` state with `initial_message` as its
    /// first history entry. No event is emitted — there can be no listener
    /// yet, since the caller doesn't have a `task_id` to subscribe with
    /// until this returns.
    async fn create_task(
        &self,
        initial_message: Message,
        webhook_url: Option<String>,
        metadata: Option<Value>,
    ) -> A2AResult<Task>;

    /// Fetch a full snapshot of a task.
    async fn get_task(&self, task_id: &str) -> A2AResult<Task>;

    /// Append a message to a task's history and emit a `task_message`
    /// event to every registered listener.
    async fn append_message(&self, task_id: &str, message: Message) -> A2AResult<()>;

    /// Append an artifact and emit a `task_artifact` event.
    async fn append_artifact(&self, task_id: &str, artifact: Artifact) -> A2AResult<()>;

    /// Transition a task to `new_state`, emitting a `task_status` event.
    ///
    /// Duplicate transitions to the task's current terminal state are a
    /// silent no-op (spec §4.6); any other illegal transition — including
    /// out of a terminal state, or skipping a non-adjacent state — raises
    /// [`A2AError::InvalidTransition`]. `message` becomes the event's
    /// optional status message (e.g. a failure reason).
    async fn update_state(
        &self,
        task_id: &str,
        new_state: TaskState,
        message: Option<Message>,
    ) -> A2AResult<()>;

    /// Register a new listener, seeded with a synthetic snapshot of the
    /// task's current status as its first queued event. If the task is
    /// already in a terminal state, the listener is handed that one
    /// snapshot and then closed — there is nothing further to deliver.
    async fn add_listener(&self, task_id: &str) -> A2AResult<TaskListener>;

    /// Deregister a listener. A listener already removed, or belonging to
    /// an unknown task, is a silent no-op — `remove_listener` is cleanup,
    /// not a query.
    async fn remove_listener(&self, task_id: &str, listener_id: u64);

    /// The cancellation signal a background worker for this task should
    /// be watching — set when the task transitions to `CANCELED` (spec
    /// §4.7's "the worker observes cancellation through a token, not by
    /// polling task state").
    async fn cancellation_token(&self, task_id: &str) -> A2AResult<CancellationToken>;
}

struct TaskEntry {
    task: Task,
    webhook_url: Option<String>,
    listeners: Vec<(u64, mpsc::Sender<A2AEvent>)>,
    next_listener_id: u64,
    cancel_token: CancellationToken,
}

impl TaskEntry {
    fn status_snapshot(&self) -> A2AEvent {
        A2AEvent::TaskStatusUpdate(TaskStatusUpdateEvent {
            task_id: self.task.task_id.clone(),
            state: self.task.state,
            timestamp: self.task.updated_at.clone(),
            message: None,
        })
    }

    /// Send `event` to every live listener, dropping (not erroring on) any
    /// whose receiver has already gone away — a consumer that stopped
    /// polling isn't this store's problem to report. Each channel is
    /// bounded (spec §4.6), so a slow listener applies backpressure to
    /// this task's mutations rather than letting its queue grow without
    /// bound; that backpressure is scoped to this task's own mutex and
    /// never blocks unrelated tasks (spec §5).
    async fn emit(&mut self, event: A2AEvent) {
        let mut alive = Vec::with_capacity(self.listeners.len());
        for (id, tx) in self.listeners.drain(..) {
            if tx.send(event.clone()).await.is_ok() {
                alive.push((id, tx));
            }
        }
        self.listeners = alive;
    }

    /// Detach every listener after a terminal event: nothing further will
    /// ever be queued for this task, so holding channels open serves no
    /// purpose. Already-queued events (including the terminal one just
    /// sent) remain in each receiver's buffer — dropping the sender only
    /// makes `recv` return `None` once that buffer drains.
    fn close_listeners(&mut self) {
        self.listeners.clear();
    }
}

/// In-memory [`TaskStore`]. Suitable for a single-process server; data is
/// lost on restart, matching the teacher's `InMemoryTaskStore` scope.
pub struct InMemoryTaskStore {
    tasks: RwLock<HashMap<String, Arc<Mutex<TaskEntry>>>>,
    listener_capacity: usize,
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LISTENER_CAPACITY)
    }
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store whose listener channels are bounded to `capacity`
    /// entries each (spec §4.6) instead of the default. A capacity of 0 is
    /// treated as 1 — a channel needs room for at least the synthetic
    /// snapshot every new listener is seeded with.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            listener_capacity: capacity.max(1),
        }
    }

    async fn entry(&self, task_id: &str) -> A2AResult<Arc<Mutex<TaskEntry>>> {
        self.tasks
            .read()
            .await
            .get(task_id)
            .cloned()
            .ok_or_else(|| A2AError::task_not_found(task_id))
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn create_task(
        &self,
        initial_message: Message,
        webhook_url: Option<String>,
        metadata: Option<Value>,
    ) -> A2AResult<Task> {
        let now = chrono::Utc::now().to_rfc3339();
        let task_id = uuid::Uuid::new_v4().to_string();
        let task = Task {
            task_id: task_id.clone(),
            created_at: now.clone(),
            updated_at: now,
            state: TaskState::Submitted,
            messages: vec![initial_message],
            artifacts: Vec::new(),
            metadata,
        };

        let entry = TaskEntry {
            task: task.clone(),
            webhook_url,
            listeners: Vec::new(),
            next_listener_id: 0,
            cancel_token: CancellationToken::new(),
        };

        self.tasks
            .write()
            .await
            .insert(task_id.clone(), Arc::new(Mutex::new(entry)));
        debug!(task_id = %task_id, "task created");
        Ok(task)
    }

    async fn get_task(&self, task_id: &str) -> A2AResult<Task> {
        let entry = self.entry(task_id).await?;
        let guard = entry.lock().await;
        Ok(guard.task.clone())
    }

    async fn append_message(&self, task_id: &str, message: Message) -> A2AResult<()> {
        let entry = self.entry(task_id).await?;
        let mut guard = entry.lock().await;
        guard.task.messages.push(message.clone());
        guard.task.updated_at = chrono::Utc::now().to_rfc3339();
        let event = A2AEvent::TaskMessage(TaskMessageEvent {
            task_id: task_id.to_string(),
            message,
            timestamp: guard.task.updated_at.clone(),
        });
        guard.emit(event).await;
        Ok(())
    }

    async fn append_artifact(&self, task_id: &str, artifact: Artifact) -> A2AResult<()> {
        let entry = self.entry(task_id).await?;
        let mut guard = entry.lock().await;
        guard.task.artifacts.push(artifact.clone());
        guard.task.updated_at = chrono::Utc::now().to_rfc3339();
        let event = A2AEvent::TaskArtifactUpdate(TaskArtifactUpdateEvent {
            task_id: task_id.to_string(),
            artifact,
            timestamp: guard.task.updated_at.clone(),
        });
        guard.emit(event).await;
        Ok(())
    }

    async fn update_state(
        &self,
        task_id: &str,
        new_state: TaskState,
        message: Option<Message>,
    ) -> A2AResult<()> {
        let entry = self.entry(task_id).await?;
        let mut guard = entry.lock().await;
        let current = guard.task.state;

        if current.is_terminal() {
            if current == new_state {
                return Ok(());
            }
            return Err(A2AError::InvalidTransition {
                task_id: task_id.to_string(),
                from: current.to_string(),
                to: new_state.to_string(),
            });
        }

        if !current.can_transition_to(new_state) {
            return Err(A2AError::InvalidTransition {
                task_id: task_id.to_string(),
                from: current.to_string(),
                to: new_state.to_string(),
            });
        }

        guard.task.state = new_state;
        guard.task.updated_at = chrono::Utc::now().to_rfc3339();
        let event = A2AEvent::TaskStatusUpdate(TaskStatusUpdateEvent {
            task_id: task_id.to_string(),
            state: new_state,
            timestamp: guard.task.updated_at.clone(),
            message,
        });
        guard.emit(event).await;

        if new_state == TaskState::Canceled {
            guard.cancel_token.cancel();
        }
        if new_state.is_terminal() {
            guard.close_listeners();
        }

        Ok(())
    }

    async fn add_listener(&self, task_id: &str) -> A2AResult<TaskListener> {
        let entry = self.entry(task_id).await?;
        let mut guard = entry.lock().await;

        let (tx, rx) = mpsc::channel(self.listener_capacity);
        let snapshot = guard.status_snapshot();
        // The snapshot always gets queued, even for a terminal task, so a
        // subscriber that arrives after the fact still learns the outcome.
        // The channel is freshly created with room for at least one entry,
        // so this never actually blocks.
        let _ = tx.send(snapshot).await;

        let id = guard.next_listener_id;
        guard.next_listener_id += 1;

        if !guard.task.state.is_terminal() {
            guard.listeners.push((id, tx));
        }
        // else: `tx` is dropped here, closing the channel once `rx` has
        // drained the one snapshot event already queued.

        Ok(TaskListener { id, receiver: rx })
    }

    async fn remove_listener(&self, task_id: &str, listener_id: u64) {
        if let Ok(entry) = self.entry(task_id).await {
            let mut guard = entry.lock().await;
            guard.listeners.retain(|(id, _)| *id != listener_id);
        } else {
            warn!(task_id, listener_id, "remove_listener on unknown task");
        }
    }

    async fn cancellation_token(&self, task_id: &str) -> A2AResult<CancellationToken> {
        let entry = self.entry(task_id).await?;
        let guard = entry.lock().await;
        Ok(guard.cancel_token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg() -> Message {
        Message::user("hello")
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = InMemoryTaskStore::new();
        let task = store.create_task(msg(), None, None).await.unwrap();
        assert_eq!(task.state, TaskState::Submitted);
        let fetched = store.get_task(&task.task_id).await.unwrap();
        assert_eq!(fetched.task_id, task.task_id);
        assert_eq!(fetched.messages.len(), 1);
    }

    #[tokio::test]
    async fn get_unknown_task_errors() {
        let store = InMemoryTaskStore::new();
        let err = store.get_task("nope").await.unwrap_err();
        assert!(matches!(err, A2AError::TaskNotFound { .. }));
    }

    #[tokio::test]
    async fn illegal_transition_is_rejected() {
        let store = InMemoryTaskStore::new();
        let task = store.create_task(msg(), None, None).await.unwrap();
        let err = store
            .update_state(&task.task_id, TaskState::Completed, None)
            .await
            .unwrap_err();
        assert!(matches!(err, A2AError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn duplicate_terminal_transition_is_noop() {
        let store = InMemoryTaskStore::new();
        let task = store.create_task(msg(), None, None).await.unwrap();
        store
            .update_state(&task.task_id, TaskState::Working, None)
            .await
            .unwrap();
        store
            .update_state(&task.task_id, TaskState::Completed, None)
            .await
            .unwrap();
        store
            .update_state(&task.task_id, TaskState::Completed, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn transition_after_terminal_is_rejected() {
        let store = InMemoryTaskStore::new();
        let task = store.create_task(msg(), None, None).await.unwrap();
        store
            .update_state(&task.task_id, TaskState::Failed, None)
            .await
            .unwrap();
        let err = store
            .update_state(&task.task_id, TaskState::Working, None)
            .await
            .unwrap_err();
        assert!(matches!(err, A2AError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn listener_receives_synthetic_snapshot_first() {
        let store = InMemoryTaskStore::new();
        let task = store.create_task(msg(), None, None).await.unwrap();
        let mut listener = store.add_listener(&task.task_id).await.unwrap();
        let first = listener.receiver.recv().await.unwrap();
        match first {
            A2AEvent::TaskStatusUpdate(update) => assert_eq!(update.state, TaskState::Submitted),
            other => panic!("expected snapshot status update, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn listener_sees_subsequent_events_in_order() {
        let store = InMemoryTaskStore::new();
        let task = store.create_task(msg(), None, None).await.unwrap();
        let mut listener = store.add_listener(&task.task_id).await.unwrap();
        let _ = listener.receiver.recv().await; // snapshot

        store
            .update_state(&task.task_id, TaskState::Working, None)
            .await
            .unwrap();
        store.append_message(&task.task_id, msg()).await.unwrap();
        store
            .update_state(&task.task_id, TaskState::Completed, None)
            .await
            .unwrap();

        assert!(matches!(
            listener.receiver.recv().await.unwrap(),
            A2AEvent::TaskStatusUpdate(u) if u.state == TaskState::Working
        ));
        assert!(matches!(
            listener.receiver.recv().await.unwrap(),
            A2AEvent::TaskMessage(_)
        ));
        assert!(matches!(
            listener.receiver.recv().await.unwrap(),
            A2AEvent::TaskStatusUpdate(u) if u.state == TaskState::Completed
        ));
        // Channel closes once the task reaches a terminal state.
        assert!(listener.receiver.recv().await.is_none());
    }

    #[tokio::test]
    async fn late_listener_on_terminal_task_gets_one_snapshot_then_closes() {
        let store = InMemoryTaskStore::new();
        let task = store.create_task(msg(), None, None).await.unwrap();
        store
            .update_state(&task.task_id, TaskState::Failed, None)
            .await
            .unwrap();

        let mut listener = store.add_listener(&task.task_id).await.unwrap();
        let first = listener.receiver.recv().await.unwrap();
        assert!(matches!(
            first,
            A2AEvent::TaskStatusUpdate(u) if u.state == TaskState::Failed
        ));
        assert!(listener.receiver.recv().await.is_none());
    }

    #[tokio::test]
    async fn cancel_sets_cancellation_token() {
        let store = InMemoryTaskStore::new();
        let task = store.create_task(msg(), None, None).await.unwrap();
        let token = store.cancellation_token(&task.task_id).await.unwrap();
        assert!(!token.is_cancelled());
        store
            .update_state(&task.task_id, TaskState::Canceled, None)
            .await
            .unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn removed_listener_stops_receiving() {
        let store = InMemoryTaskStore::new();
        let task = store.create_task(msg(), None, None).await.unwrap();
        let mut listener = store.add_listener(&task.task_id).await.unwrap();
        let _ = listener.receiver.recv().await; // snapshot
        store.remove_listener(&task.task_id, listener.id).await;
        store
            .update_state(&task.task_id, TaskState::Working, None)
            .await
            .unwrap();
        assert!(listener.receiver.recv().await.is_none());
    }
}
