//! Ergonomic builders for the crate's heavier-to-construct types.
//!
//! Grounded on the teacher's `AgentCardBuilder`/`ClientBuilder`/
//! `ServerBuilder` (fluent setter methods, validate-on-`build`), reworked
//! around the spec's `AgentCard` shape (§3) and the client/server API this
//! crate actually exposes.

use crate::types::{AgentCapabilities, AgentCard, AgentProvider, AuthScheme};
use crate::error::A2AResult;

/// Builder for [`AgentCard`]. `build()` runs the same validation
/// [`AgentCard::from_dict`] would (spec §4.1) — a builder-constructed card
/// that fails HRI/URL/auth-scheme rules is rejected just like a
/// hand-written JSON one.
#[derive(Debug, Clone)]
pub struct AgentCardBuilder {
    schema_version: String,
    human_readable_id: String,
    name: String,
    description: String,
    provider: AgentProvider,
    agent_version: String,
    url: String,
    capabilities: AgentCapabilities,
    auth_schemes: Vec<AuthScheme>,
    skills: Vec<String>,
    tags: Vec<String>,
    privacy_policy_url: Option<String>,
    icon_url: Option<String>,
}

impl AgentCardBuilder {
    /// `human_readable_id` is the catalog key (`org/name`, spec §3);
    /// `name`/`description` are free text.
    pub fn new(
        human_readable_id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            schema_version: "1.0".to_string(),
            human_readable_id: human_readable_id.into(),
            name: name.into(),
            description: description.into(),
            provider: AgentProvider {
                name: String::new(),
                url: None,
                contact: None,
            },
            agent_version: "0.1.0".to_string(),
            url: String::new(),
            capabilities: AgentCapabilities {
                a2a_version: "1.0".to_string(),
                supported_message_parts: Vec::new(),
                supports_push_notifications: None,
                tee_details: None,
            },
            auth_schemes: vec![AuthScheme::None],
            skills: Vec::new(),
            tags: Vec::new(),
            privacy_policy_url: None,
            icon_url: None,
        }
    }

    /// Set the A2A endpoint base (spec §3: HTTPS unless the host is
    /// localhost/127.0.0.1).
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn agent_version(mut self, version: impl Into<String>) -> Self {
        self.agent_version = version.into();
        self
    }

    pub fn schema_version(mut self, version: impl Into<String>) -> Self {
        self.schema_version = version.into();
        self
    }

    pub fn provider(mut self, name: impl Into<String>, url: Option<String>) -> Self {
        self.provider = AgentProvider {
            name: name.into(),
            url,
            contact: None,
        };
        self
    }

    /// Replace the default `[AuthScheme::None]` with a declared preference
    /// order. Clients try these in order (spec §4.4).
    pub fn auth_schemes(mut self, schemes: Vec<AuthScheme>) -> Self {
        self.auth_schemes = schemes;
        self
    }

    pub fn supported_message_parts(mut self, parts: Vec<String>) -> Self {
        self.capabilities.supported_message_parts = parts;
        self
    }

    pub fn supports_push_notifications(mut self, enabled: bool) -> Self {
        self.capabilities.supports_push_notifications = Some(enabled);
        self
    }

    pub fn skill(mut self, skill: impl Into<String>) -> Self {
        self.skills.push(skill.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn icon_url(mut self, url: impl Into<String>) -> Self {
        self.icon_url = Some(url.into());
        self
    }

    pub fn privacy_policy_url(mut self, url: impl Into<String>) -> Self {
        self.privacy_policy_url = Some(url.into());
        self
    }

    /// Construct and validate the card.
    pub fn build(self) -> A2AResult<AgentCard> {
        let card = AgentCard {
            schema_version: self.schema_version,
            human_readable_id: self.human_readable_id,
            name: self.name,
            description: self.description,
            provider: self.provider,
            agent_version: self.agent_version,
            url: self.url,
            capabilities: self.capabilities,
            auth_schemes: self.auth_schemes,
            skills: self.skills,
            tags: self.tags,
            privacy_policy_url: self.privacy_policy_url,
            icon_url: self.icon_url,
        };
        AgentCard::from_dict(card.to_dict())
    }
}

/// Builder for [`crate::client::A2AClient`] — mostly a home for
/// [`crate::config::AgentVaultConfig`] knobs plus an optional shared
/// `reqwest::Client`.
#[cfg(feature = "client")]
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    config: crate::config::AgentVaultConfig,
    http: Option<reqwest::Client>,
}

#[cfg(feature = "client")]
impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config.call_timeout = timeout;
        self
    }

    pub fn sse_idle_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config.sse_idle_timeout = timeout;
        self
    }

    pub fn config(mut self, config: crate::config::AgentVaultConfig) -> Self {
        self.config = config;
        self
    }

    /// Share a `reqwest::Client` (connection pool, proxy, TLS config) across
    /// calls instead of letting the client build its own.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    pub fn build(self) -> crate::client::A2AClient {
        match self.http {
            Some(client) => crate::client::A2AClient::with_http_client(self.config, client),
            None => crate::client::A2AClient::new(self.config),
        }
    }
}

/// Builder for an axum `Router` hosting an [`crate::server::AgentLogic`]
/// implementation behind the A2A wire protocol.
#[cfg(feature = "server")]
pub struct ServerBuilder {
    logic: std::sync::Arc<dyn crate::server::AgentLogic>,
    task_store: Option<std::sync::Arc<dyn crate::server::TaskStore>>,
    agent_card: Option<AgentCard>,
    cors_enabled: bool,
    config: crate::config::AgentVaultConfig,
}

#[cfg(feature = "server")]
impl ServerBuilder {
    pub fn new(logic: std::sync::Arc<dyn crate::server::AgentLogic>) -> Self {
        Self {
            logic,
            task_store: None,
            agent_card: None,
            cors_enabled: false,
            config: crate::config::AgentVaultConfig::default(),
        }
    }

    pub fn with_task_store(mut self, store: std::sync::Arc<dyn crate::server::TaskStore>) -> Self {
        self.task_store = Some(store);
        self
    }

    pub fn with_agent_card(mut self, card: AgentCard) -> Self {
        self.agent_card = Some(card);
        self
    }

    pub fn with_cors(mut self, enabled: bool) -> Self {
        self.cors_enabled = enabled;
        self
    }

    /// Config knobs for the default task store (e.g. `listener_capacity`).
    /// Ignored once [`Self::with_task_store`] supplies a store directly —
    /// a caller-provided store owns its own configuration.
    pub fn config(mut self, config: crate::config::AgentVaultConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the router. Fails if no agent card was supplied — unlike the
    /// task store, there is no sensible default to fall back to.
    pub fn build(self) -> A2AResult<axum::Router> {
        use crate::server::{a2a_router, AgentSkeleton, InMemoryTaskStore};
        use std::sync::Arc;

        let card = self
            .agent_card
            .ok_or_else(|| crate::error::A2AError::validation("agent card is required"))?;
        let store = self.task_store.unwrap_or_else(|| {
            Arc::new(InMemoryTaskStore::with_capacity(
                self.config.listener_capacity,
            ))
        });
        let skeleton = Arc::new(AgentSkeleton::new(store, self.logic));

        let mut router = a2a_router(skeleton, card);
        if self.cors_enabled {
            use tower_http::cors::CorsLayer;
            router = router.layer(CorsLayer::permissive());
        }
        Ok(router)
    }
}
