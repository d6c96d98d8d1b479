//! Shared fixtures for the end-to-end integration tests: a few
//! [`AgentLogic`] implementations plus a helper that brings up a real
//! server on a random local port.

use std::sync::Arc;

use agentvault_a2a::builders::AgentCardBuilder;
use agentvault_a2a::error::{A2AError, A2AResult};
use agentvault_a2a::server::{a2a_router, AgentLogic, AgentSkeleton, InMemoryTaskStore, WorkerHandle};
use agentvault_a2a::types::{AgentCard, Message};
use async_trait::async_trait;

pub struct EchoAgent;

#[async_trait]
impl AgentLogic for EchoAgent {
    async fn handle_message(&self, handle: WorkerHandle, message: Message) -> A2AResult<()> {
        let reply = format!("echo: {}", message.text_content());
        handle.send_message(Message::assistant(reply)).await?;
        handle.complete().await
    }
}

/// An agent that asks a clarifying question instead of completing, so tests
/// can exercise the `INPUT_REQUIRED` branch of the lifecycle.
pub struct AskingAgent;

#[async_trait]
impl AgentLogic for AskingAgent {
    async fn handle_message(&self, handle: WorkerHandle, _message: Message) -> A2AResult<()> {
        handle
            .send_message(Message::assistant("which format do you want?"))
            .await?;
        handle.mark_input_required().await
    }
}

pub struct FailingAgent;

#[async_trait]
impl AgentLogic for FailingAgent {
    async fn handle_message(&self, _handle: WorkerHandle, _message: Message) -> A2AResult<()> {
        Err(A2AError::validation("intentional failure"))
    }
}

/// An agent that waits to be canceled before ever completing, for exercising
/// `tasks/cancel` against a task that's actually in flight.
pub struct StallingAgent;

#[async_trait]
impl AgentLogic for StallingAgent {
    async fn handle_message(&self, handle: WorkerHandle, _message: Message) -> A2AResult<()> {
        handle.canceled().await;
        Ok(())
    }
}

pub fn test_agent_card(url: &str) -> AgentCard {
    AgentCardBuilder::new("test/echo", "Test Echo Agent", "An echo agent for testing")
        .url(url)
        .build()
        .expect("builder produces a valid card")
}

/// Start a server hosting `logic` behind a fresh in-memory store on a
/// random local port. Returns the base URL, the agent card advertising it,
/// and a handle the test can abort when it's done.
pub async fn start_test_server(
    logic: Arc<dyn AgentLogic>,
) -> (String, AgentCard, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");

    let store = Arc::new(InMemoryTaskStore::new());
    let skeleton = Arc::new(AgentSkeleton::new(store, logic));
    let card = test_agent_card(&format!("{base_url}/a2a"));
    let app = a2a_router(skeleton, card.clone());

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the listener a moment to start accepting connections.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    (base_url, card, handle)
}
