//! Task lifecycle (C6): the state machine and listener fan-out against
//! [`InMemoryTaskStore`] directly, independent of the dispatcher/HTTP layer.

use std::sync::Arc;

use agentvault_a2a::error::A2AError;
use agentvault_a2a::server::{InMemoryTaskStore, TaskStore};
use agentvault_a2a::types::{Message, TaskState};

#[tokio::test]
async fn new_task_starts_submitted() {
    let store = InMemoryTaskStore::new();
    let task = store.create_task(Message::user("hi"), None, None).await.unwrap();
    assert_eq!(task.state, TaskState::Submitted);
    assert_eq!(task.messages.len(), 1);
}

#[tokio::test]
async fn every_documented_transition_succeeds() {
    let store = InMemoryTaskStore::new();
    let task = store.create_task(Message::user("hi"), None, None).await.unwrap();

    store.update_state(&task.task_id, TaskState::Working, None).await.unwrap();
    store
        .update_state(&task.task_id, TaskState::InputRequired, None)
        .await
        .unwrap();
    store.update_state(&task.task_id, TaskState::Working, None).await.unwrap();
    store.update_state(&task.task_id, TaskState::Completed, None).await.unwrap();

    let task = store.get_task(&task.task_id).await.unwrap();
    assert_eq!(task.state, TaskState::Completed);
}

#[tokio::test]
async fn leaving_a_terminal_state_is_rejected() {
    let store = InMemoryTaskStore::new();
    let task = store.create_task(Message::user("hi"), None, None).await.unwrap();
    store.update_state(&task.task_id, TaskState::Completed, None).await.unwrap();

    let err = store
        .update_state(&task.task_id, TaskState::Working, None)
        .await
        .unwrap_err();
    assert!(matches!(err, A2AError::InvalidTransition { .. }));
}

#[tokio::test]
async fn re_reporting_the_same_terminal_state_is_a_no_op() {
    let store = InMemoryTaskStore::new();
    let task = store.create_task(Message::user("hi"), None, None).await.unwrap();
    store.update_state(&task.task_id, TaskState::Completed, None).await.unwrap();

    store.update_state(&task.task_id, TaskState::Completed, None).await.unwrap();
    let task = store.get_task(&task.task_id).await.unwrap();
    assert_eq!(task.state, TaskState::Completed);
}

#[tokio::test]
async fn skipping_working_straight_to_completed_is_rejected() {
    let store = InMemoryTaskStore::new();
    let task = store.create_task(Message::user("hi"), None, None).await.unwrap();

    let err = store
        .update_state(&task.task_id, TaskState::Completed, None)
        .await
        .unwrap_err();
    assert!(matches!(err, A2AError::InvalidTransition { .. }));
}

#[tokio::test]
async fn listener_sees_every_mutation_in_order() {
    let store = InMemoryTaskStore::new();
    let task = store.create_task(Message::user("hi"), None, None).await.unwrap();
    let mut listener = store.add_listener(&task.task_id).await.unwrap();

    // Synthetic snapshot first.
    let snapshot = listener.receiver.recv().await.unwrap();
    assert!(matches!(snapshot, agentvault_a2a::types::A2AEvent::TaskStatusUpdate(_)));

    store.update_state(&task.task_id, TaskState::Working, None).await.unwrap();
    store.append_message(&task.task_id, Message::assistant("progress")).await.unwrap();
    store.update_state(&task.task_id, TaskState::Completed, None).await.unwrap();

    let working = listener.receiver.recv().await.unwrap();
    let message = listener.receiver.recv().await.unwrap();
    let completed = listener.receiver.recv().await.unwrap();

    assert!(matches!(working, agentvault_a2a::types::A2AEvent::TaskStatusUpdate(_)));
    assert!(matches!(message, agentvault_a2a::types::A2AEvent::TaskMessage(_)));
    assert!(matches!(completed, agentvault_a2a::types::A2AEvent::TaskStatusUpdate(_)));

    // Channel closes once the task is terminal.
    assert!(listener.receiver.recv().await.is_none());
}

#[tokio::test]
async fn canceling_flips_the_cancellation_token() {
    let store = Arc::new(InMemoryTaskStore::new());
    let task = store.create_task(Message::user("hi"), None, None).await.unwrap();
    let token = store.cancellation_token(&task.task_id).await.unwrap();
    assert!(!token.is_cancelled());

    store.update_state(&task.task_id, TaskState::Canceled, None).await.unwrap();
    assert!(token.is_cancelled());
}

#[tokio::test]
async fn operations_on_an_unknown_task_return_task_not_found() {
    let store = InMemoryTaskStore::new();
    let err = store.get_task("nope").await.unwrap_err();
    assert!(matches!(err, A2AError::TaskNotFound { .. }));
}
