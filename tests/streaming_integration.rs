//! `tasks/sendSubscribe` end to end: open the SSE stream over a real HTTP
//! connection and check the events it actually carries (spec §4.4/§4.6).

mod common;

use std::sync::Arc;
use std::time::Duration;

use agentvault_a2a::config::AgentVaultConfig;
use agentvault_a2a::credentials::CredentialResolver;
use agentvault_a2a::types::{A2AEvent, Message};

use common::EchoAgent;

#[tokio::test]
async fn subscribing_after_send_observes_the_status_transitions() {
    let (_, card, _handle) = common::start_test_server(Arc::new(EchoAgent)).await;
    let config = AgentVaultConfig::default();
    let resolver = CredentialResolver::new(&config);
    let client = agentvault_a2a::client::A2AClient::new(config);

    let task_id = client
        .initiate_task(&card, Message::user("hi"), &resolver, None, None)
        .await
        .unwrap();

    let mut stream = client.receive_messages(&card, &task_id, &resolver).await.unwrap();

    let mut saw_completed = false;
    let mut saw_message = false;
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while tokio::time::Instant::now() < deadline {
        let next = tokio::time::timeout(Duration::from_millis(200), stream.next()).await;
        let Ok(Some(event)) = next else { continue };
        match event.unwrap() {
            A2AEvent::TaskStatusUpdate(update) if update.state == agentvault_a2a::types::TaskState::Completed => {
                saw_completed = true;
            }
            A2AEvent::TaskMessage(_) => saw_message = true,
            _ => {}
        }
        if saw_completed && saw_message {
            break;
        }
    }

    assert!(saw_message, "expected at least one task_message event");
    assert!(saw_completed, "expected the stream to report completion");
}

#[tokio::test]
async fn late_subscriber_to_a_finished_task_gets_a_snapshot_then_closes() {
    let (_, card, _handle) = common::start_test_server(Arc::new(EchoAgent)).await;
    let config = AgentVaultConfig::default();
    let resolver = CredentialResolver::new(&config);
    let client = agentvault_a2a::client::A2AClient::new(config);

    let task_id = client
        .initiate_task(&card, Message::user("hi"), &resolver, None, None)
        .await
        .unwrap();

    // Let the worker actually finish before subscribing.
    for _ in 0..20 {
        let task = client.get_task_status(&card, &task_id, &resolver).await.unwrap();
        if task.state.is_terminal() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let mut stream = client.receive_messages(&card, &task_id, &resolver).await.unwrap();
    let first = tokio::time::timeout(Duration::from_secs(1), stream.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(matches!(first, A2AEvent::TaskStatusUpdate(_)));

    // The channel closes after the synthetic snapshot; no more events.
    let second = tokio::time::timeout(Duration::from_millis(300), stream.next()).await;
    assert!(second.is_err() || matches!(second, Ok(None)));
}
