//! A2A Client (C4) — call remote A2A agents over JSON-RPC 2.0 + SSE.
//!
//! - [`A2AClient`] — typed methods for every JSON-RPC method in spec §4.4
//! - [`CredentialResolver`]-driven auth pipeline ([`auth::resolve_auth`]):
//!   scheme selection, header construction, OAuth2 Client Credentials
//!   token exchange and caching
//! - [`AgentCard::from_url`] (in `card_resolver.rs`) — the network half of
//!   the Agent Card Loader (C1); `from_file`/`from_dict` live in `card.rs`
//!   and need no `client` feature
//! - [`RegistryClient`] (C8) — read path against the registry catalog
//! - [`Transport`]/[`JsonRpcTransport`] — pluggable JSON-RPC transport
//! - [`SseStream`] — parsed SSE event stream for `receive_messages`
//!
//! # Quick start
//!
//! ```no_run
//! use agentvault_a2a::client::A2AClient;
//! use agentvault_a2a::config::AgentVaultConfig;
//! use agentvault_a2a::credentials::CredentialResolver;
//! use agentvault_a2a::types::{AgentCard, Message};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let card = AgentCard::from_file("agent-card.json")?;
//! let config = AgentVaultConfig::default();
//! let resolver = CredentialResolver::new(&config);
//! let client = A2AClient::new(config);
//!
//! let task_id = client
//!     .initiate_task(&card, Message::user("hi"), &resolver, None, None)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
mod card_resolver;
mod client;
mod registry_client;
mod sse;
mod transport;

pub use auth::TokenCache;
pub use client::A2AClient;
pub use registry_client::{AgentCardSummary, ListQuery, RegistryClient, RegistryListResponse};
pub use sse::{SseStream, SseStreamAdapter};
pub use transport::{JsonRpcTransport, Transport};
