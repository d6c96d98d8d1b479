//! Crate-wide configuration surface.
//!
//! Generalizes the scattered `Default` impls the teacher kept next to each
//! type that needed one (`TransportConfig::default`, the hardcoded capacity
//! in `EventQueue::with_default_capacity`, ...) into a single struct callers
//! can build once and thread through client, resolver, and store
//! construction.

use std::time::Duration;

use crate::utils::constants::{
    DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_CARD_FETCH_TIMEOUT_SECS, DEFAULT_CREDENTIAL_ENV_PREFIX,
    DEFAULT_LISTENER_CAPACITY, DEFAULT_OAUTH_SAFETY_MARGIN_SECS, DEFAULT_REDIRECT_LIMIT,
    DEFAULT_SSE_IDLE_TIMEOUT_SECS,
};

/// Tunables for the client, credential resolver, and (where relevant) the
/// in-memory task store. Constructed once per process and shared via
/// `Arc` or plain `Clone` — it's a plain value type, cheap to copy around.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentVaultConfig {
    /// Deadline for a single unary JSON-RPC call (spec §4.4).
    pub call_timeout: Duration,
    /// Idle-read deadline for an open SSE stream (spec §4.4).
    pub sse_idle_timeout: Duration,
    /// Deadline for `AgentCard::from_url` (spec §4.1).
    pub card_fetch_timeout: Duration,
    /// Maximum same-scheme redirects `AgentCard::from_url` will follow.
    pub redirect_limit: usize,
    /// Subtracted from an OAuth2 token's `expires_in` before it's treated
    /// as expired (spec §4.4).
    pub oauth_safety_margin: Duration,
    /// Prefix for credential environment variables (spec §4.2), e.g. the
    /// default `AGENTVAULT` yields `AGENTVAULT_KEY_<ID>`.
    pub credential_env_prefix: String,
    /// Whether the Credential Resolver attempts OS keychain lookups at all
    /// (spec §9 — the keychain is an optional source; core must function
    /// without it even when the `keychain` feature is compiled in).
    pub keychain_enabled: bool,
    /// Bounded capacity of a listener's event channel (spec §4.6).
    pub listener_capacity: usize,
}

impl Default for AgentVaultConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
            sse_idle_timeout: Duration::from_secs(DEFAULT_SSE_IDLE_TIMEOUT_SECS),
            card_fetch_timeout: Duration::from_secs(DEFAULT_CARD_FETCH_TIMEOUT_SECS),
            redirect_limit: DEFAULT_REDIRECT_LIMIT,
            oauth_safety_margin: Duration::from_secs(DEFAULT_OAUTH_SAFETY_MARGIN_SECS as u64),
            credential_env_prefix: DEFAULT_CREDENTIAL_ENV_PREFIX.to_string(),
            keychain_enabled: true,
            listener_capacity: DEFAULT_LISTENER_CAPACITY,
        }
    }
}

impl AgentVaultConfig {
    /// Build a config from `AGENTVAULT_*` environment variables, falling
    /// back to [`Default`] for anything unset or unparseable.
    ///
    /// Recognized variables:
    /// - `AGENTVAULT_CALL_TIMEOUT_SECS`
    /// - `AGENTVAULT_SSE_IDLE_TIMEOUT_SECS`
    /// - `AGENTVAULT_CARD_FETCH_TIMEOUT_SECS`
    /// - `AGENTVAULT_REDIRECT_LIMIT`
    /// - `AGENTVAULT_CREDENTIAL_ENV_PREFIX`
    /// - `AGENTVAULT_KEYCHAIN_ENABLED` (`"false"`/`"0"` disables)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(secs) = env_u64("AGENTVAULT_CALL_TIMEOUT_SECS") {
            config.call_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_u64("AGENTVAULT_SSE_IDLE_TIMEOUT_SECS") {
            config.sse_idle_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_u64("AGENTVAULT_CARD_FETCH_TIMEOUT_SECS") {
            config.card_fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(limit) = std::env::var("AGENTVAULT_REDIRECT_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.redirect_limit = limit;
        }
        if let Ok(prefix) = std::env::var("AGENTVAULT_CREDENTIAL_ENV_PREFIX") {
            if !prefix.is_empty() {
                config.credential_env_prefix = prefix;
            }
        }
        if let Ok(flag) = std::env::var("AGENTVAULT_KEYCHAIN_ENABLED") {
            config.keychain_enabled = !matches!(flag.as_str(), "false" | "0");
        }

        config
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
