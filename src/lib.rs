//! # agentvault-a2a — Rust SDK for the AgentVault Agent-to-Agent (A2A) Core
//!
//! A secure, transport-agnostic protocol runtime for AI agents to discover,
//! authenticate to, and exchange long-running tasks with one another: a
//! JSON-RPC 2.0 + Server-Sent Events wire protocol, a task lifecycle engine,
//! a server-side task store, and a client with a pluggable credential
//! pipeline.
//!
//! ## Overview
//!
//! This crate covers:
//! - **Agent Cards** ([`card`], [`types::AgentCard`]) — self-describing agent
//!   metadata, loaded from a file, an inline value, or a URL
//! - **Credential Resolver** ([`credentials`]) — layered environment/file/OS
//!   keychain lookup for API keys and OAuth2 client credentials
//! - **Client** ([`client`]) — typed calls against a remote agent, with an
//!   auth pipeline that tries the card's advertised schemes in order
//! - **Task lifecycle & store** ([`server::TaskStore`]) — the state machine
//!   and event fan-out every server-side task goes through
//! - **Agent Skeleton** ([`server::AgentSkeleton`], [`server::AgentLogic`]) —
//!   the narrow trait an agent implementation fulfills; everything else
//!   (dispatch, store bookkeeping, SSE framing) is handled for it
//! - **Registry client** ([`client::RegistryClient`]) — read path against an
//!   agent catalog
//!
//! ## Feature flags
//!
//! | Feature    | Default | Description |
//! |------------|---------|-------------|
//! | `client`   | yes     | HTTP client for calling A2A agents (reqwest + SSE) |
//! | `server`   | yes     | Server traits + axum integration for hosting agents |
//! | `keychain` | no      | OS keychain as a credential source (via `keyring`) |
//! | `full`     | no      | Enable all of the above |
//!
//! ## Quick Start: Client
//!
//! ```no_run
//! use agentvault_a2a::client::A2AClient;
//! use agentvault_a2a::config::AgentVaultConfig;
//! use agentvault_a2a::credentials::CredentialResolver;
//! use agentvault_a2a::types::{AgentCard, Message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let card = AgentCard::from_file("agent-card.json")?;
//!     let config = AgentVaultConfig::default();
//!     let resolver = CredentialResolver::new(&config);
//!     let client = A2AClient::new(config);
//!
//!     let task_id = client
//!         .initiate_task(&card, Message::user("Write a haiku about Rust"), &resolver, None, None)
//!         .await?;
//!     let task = client.get_task_status(&card, &task_id, &resolver).await?;
//!     println!("task {} is {:?}", task.task_id, task.state);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Quick Start: Server
//!
//! Implement [`server::AgentLogic`] to define your agent's behavior; the
//! [`server::AgentSkeleton`] around it handles task creation, state
//! transitions, and listener fan-out.
//!
//! ```rust,ignore
//! use agentvault_a2a::server::{a2a_router, AgentLogic, AgentSkeleton, InMemoryTaskStore, WorkerHandle};
//! use agentvault_a2a::types::Message;
//! use agentvault_a2a::error::A2AResult;
//! use agentvault_a2a::AgentCardBuilder;
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct EchoAgent;
//!
//! #[async_trait]
//! impl AgentLogic for EchoAgent {
//!     async fn handle_message(&self, handle: WorkerHandle, message: Message) -> A2AResult<()> {
//!         let reply = format!("echo: {}", message.text_content());
//!         handle.send_message(Message::assistant(reply)).await?;
//!         handle.complete().await
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let agent_card = AgentCardBuilder::new("acme/echo", "Echo Agent", "Echoes messages back")
//!         .url("http://localhost:3000/a2a")
//!         .build()?;
//!
//!     let store = Arc::new(InMemoryTaskStore::new());
//!     let skeleton = Arc::new(AgentSkeleton::new(store, Arc::new(EchoAgent)));
//!     let app = a2a_router(skeleton, agent_card);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! The router above provides:
//! - `POST /a2a` — JSON-RPC 2.0 endpoint for `tasks/send`, `tasks/get`,
//!   `tasks/cancel`, and `tasks/sendSubscribe` (SSE)
//! - `GET /.well-known/agent-card.json` — agent card discovery
//!
//! Authentication is deliberately not part of this router: wrap it in
//! whatever `tower` middleware enforces the host's auth policy.
//!
//! ## Architecture
//!
//! ### Client
//!
//! - [`client::A2AClient`] — typed methods for every JSON-RPC method
//! - [`types::AgentCard::from_url`] — fetches and validates a remote agent card
//! - [`credentials::CredentialResolver`] — layered credential lookup
//! - [`client::RegistryClient`] — registry catalog search/listing
//! - [`client::Transport`]/[`client::JsonRpcTransport`] — pluggable transport
//! - [`client::SseStream`] — parsed SSE event stream
//!
//! ### Server
//!
//! - [`server::AgentLogic`] — the trait agent authors implement
//! - [`server::AgentSkeleton`]/[`server::WorkerHandle`] — task bookkeeping
//!   and the handle a worker uses to report progress
//! - [`server::TaskStore`]/[`server::InMemoryTaskStore`] — task persistence
//!   and per-task listener fan-out
//! - [`server::dispatch`] — JSON-RPC method routing in front of a skeleton
//! - [`server::a2a_router`] — axum `Router` wiring the dispatcher to HTTP
//!
//! ### Core Types
//!
//! - [`types::Task`]/[`types::TaskState`] — task lifecycle and state machine
//! - [`types::Message`]/[`types::Part`] — message content
//! - [`types::Artifact`] — task output
//! - [`types::A2AEvent`] — SSE event payloads
//! - [`types::AgentCard`] — agent metadata and capabilities
//! - [`error::A2AError`] — error types with JSON-RPC error codes

pub mod builders;
pub mod card;
pub mod config;
pub mod credentials;
pub mod error;
pub mod types;
pub mod utils;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "server")]
pub mod server;

/// Prelude module re-exporting the types most callers reach for.
///
/// ```
/// use agentvault_a2a::prelude::*;
/// ```
pub mod prelude {
    pub use crate::types::{
        A2AEvent, AgentCapabilities, AgentCard, AgentProvider, Artifact, AuthScheme, Message,
        Part, Task, TaskState,
    };

    pub use crate::error::{A2AError, A2AResult};

    pub use crate::config::AgentVaultConfig;
    pub use crate::credentials::CredentialResolver;

    pub use crate::builders::AgentCardBuilder;

    #[cfg(feature = "client")]
    pub use crate::builders::ClientBuilder;

    #[cfg(feature = "client")]
    pub use crate::client::A2AClient;

    #[cfg(feature = "server")]
    pub use crate::builders::ServerBuilder;

    #[cfg(feature = "server")]
    pub use crate::server::{a2a_router, AgentLogic, AgentSkeleton, InMemoryTaskStore, TaskStore, WorkerHandle};
}

// Re-export core types at crate root for convenience.
pub use builders::AgentCardBuilder;
pub use error::{A2AError, A2AResult};
pub use types::*;

#[cfg(feature = "client")]
pub use builders::ClientBuilder;

#[cfg(feature = "server")]
pub use builders::ServerBuilder;
