//! Crate-wide defaults. Centralized here so `config.rs`'s [`Default`] impl
//! and the modules that read it agree on one set of numbers.

/// Conventional path for the single JSON-RPC dispatcher endpoint (spec §6).
pub const A2A_ENDPOINT_PATH: &str = "/a2a";

/// Per-call deadline for unary client calls, absent an explicit override.
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;

/// Idle-read deadline for an open SSE stream.
pub const DEFAULT_SSE_IDLE_TIMEOUT_SECS: u64 = 60;

/// Deadline for `AgentCard::from_url`.
pub const DEFAULT_CARD_FETCH_TIMEOUT_SECS: u64 = 10;

/// Maximum same-scheme redirects `AgentCard::from_url` will follow.
pub const DEFAULT_REDIRECT_LIMIT: usize = 5;

/// Assumed OAuth2 access token lifetime when the token response omits
/// `expires_in`.
pub const DEFAULT_OAUTH_TOKEN_TTL_SECS: i64 = 300;

/// Subtracted from a token's lifetime before it is considered expired, so a
/// request doesn't race a token that dies mid-flight.
pub const DEFAULT_OAUTH_SAFETY_MARGIN_SECS: i64 = 30;

/// Default environment variable prefix for the Credential Resolver (spec §4.2).
pub const DEFAULT_CREDENTIAL_ENV_PREFIX: &str = "AGENTVAULT";

/// Upper bound on `limit` accepted by the registry catalog's list endpoint.
pub const REGISTRY_MAX_LIMIT: usize = 100;

/// Default page size when a catalog list request omits `limit`.
pub const REGISTRY_DEFAULT_LIMIT: usize = 20;

/// Bounded capacity of a single listener's event channel (spec §4.6 fan-out).
pub const DEFAULT_LISTENER_CAPACITY: usize = 64;
