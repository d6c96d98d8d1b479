//! A2A server framework (C5/C6/C7) — host an agent behind the JSON-RPC +
//! SSE wire protocol described in spec §3/§6.
//!
//! - [`TaskStore`]/[`InMemoryTaskStore`] (C6) — task persistence and
//!   listener fan-out, the one place task events are produced
//! - [`AgentLogic`]/[`AgentSkeleton`]/[`WorkerHandle`] (C7) — the contract
//!   an agent implementation fulfills, and the background-worker plumbing
//!   around it
//! - [`dispatcher::dispatch`] (C5) — JSON-RPC method routing into a skeleton
//! - [`a2a_router`] — ready-made axum routes wiring the dispatcher to HTTP
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use agentvault_a2a::server::{a2a_router, AgentLogic, AgentSkeleton, InMemoryTaskStore, WorkerHandle};
//! use agentvault_a2a::types::{AgentCard, Message};
//! use agentvault_a2a::error::A2AResult;
//! use async_trait::async_trait;
//!
//! struct EchoAgent;
//!
//! #[async_trait]
//! impl AgentLogic for EchoAgent {
//!     async fn handle_message(&self, handle: WorkerHandle, message: Message) -> A2AResult<()> {
//!         handle.send_message(Message::assistant(message.text_content())).await?;
//!         handle.complete().await
//!     }
//! }
//!
//! # async fn example(agent_card: AgentCard) {
//! let store = Arc::new(InMemoryTaskStore::new());
//! let skeleton = Arc::new(AgentSkeleton::new(store, Arc::new(EchoAgent)));
//! let app = a2a_router(skeleton, agent_card);
//! # let _ = app;
//! # }
//! ```

pub mod agent_skeleton;
pub mod axum_integration;
pub mod dispatcher;
pub mod task_store;

pub use agent_skeleton::{AgentLogic, AgentSkeleton, WorkerHandle};
pub use axum_integration::a2a_router;
pub use dispatcher::{dispatch, DispatchOutcome};
pub use task_store::{InMemoryTaskStore, TaskListener, TaskStore};
