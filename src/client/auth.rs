//! Auth pipeline (C4) — scheme selection and OAuth2 Client Credentials
//! token acquisition/caching (spec §4.4).
//!
//! No teacher analog; this is new logic layered over the teacher's
//! `JsonRpcTransport` construction, using the same `reqwest` client the
//! transport already holds.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::credentials::CredentialResolver;
use crate::error::{A2AError, A2AResult};
use crate::types::AuthScheme;
use crate::utils::constants::DEFAULT_OAUTH_TOKEN_TTL_SECS;

/// An access token cached until `expires_at`, already adjusted by the
/// configured safety margin (spec §4.4).
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Per-client cache of OAuth2 access tokens, keyed by `(service_id,
/// token_url)` (spec §4.4's "cache the returned access token per
/// `(service_id, token_url)`").
#[derive(Default)]
pub struct TokenCache {
    tokens: Mutex<HashMap<(String, String), CachedToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, service_id: &str, token_url: &str) -> Option<String> {
        let tokens = self.tokens.lock().expect("token cache poisoned");
        let cached = tokens.get(&(service_id.to_string(), token_url.to_string()))?;
        if cached.expires_at > Instant::now() {
            Some(cached.access_token.clone())
        } else {
            None
        }
    }

    fn store(&self, service_id: &str, token_url: &str, access_token: String, ttl: Duration) {
        let mut tokens = self.tokens.lock().expect("token cache poisoned");
        tokens.insert(
            (service_id.to_string(), token_url.to_string()),
            CachedToken {
                access_token,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Drop a cached token, forcing the next request to re-exchange it.
    /// Used for the spec's "on 401, invalidate the cached token once".
    pub fn invalidate(&self, service_id: &str, token_url: &str) {
        self.tokens
            .lock()
            .expect("token cache poisoned")
            .remove(&(service_id.to_string(), token_url.to_string()));
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// The resolved header(s) to attach to a request, plus enough identity to
/// invalidate the token on a 401 (OAuth2 only).
pub struct ResolvedAuth {
    pub headers: HashMap<String, String>,
    pub oauth: Option<(String, String)>, // (service_id, token_url), for invalidation
}

/// The `service_id` credentials for a scheme are looked up under. Schemes
/// that omit `service_identifier` fall back to the agent's own
/// `human_readable_id` — there is exactly one resolvable identity per
/// un-scoped scheme.
fn service_id_for(scheme: &AuthScheme, card_hri: &str) -> String {
    scheme
        .service_identifier()
        .map(str::to_lowercase)
        .unwrap_or_else(|| card_hri.to_lowercase())
}

/// Pick the first declared auth scheme the resolver can satisfy, and
/// produce the headers for it — performing an OAuth2 token exchange (or
/// serving a cached token) as needed.
pub async fn resolve_auth(
    schemes: &[AuthScheme],
    card_hri: &str,
    resolver: &CredentialResolver,
    http: &reqwest::Client,
    token_cache: &TokenCache,
    oauth_safety_margin: Duration,
) -> A2AResult<ResolvedAuth> {
    for scheme in schemes {
        let service_id = service_id_for(scheme, card_hri);
        match scheme {
            AuthScheme::None => {
                return Ok(ResolvedAuth {
                    headers: HashMap::new(),
                    oauth: None,
                });
            }
            AuthScheme::ApiKey { header_name, .. } => {
                if let Some(value) = resolver.get_api_key(&service_id) {
                    let mut headers = HashMap::new();
                    headers.insert(header_name.clone(), value);
                    return Ok(ResolvedAuth { headers, oauth: None });
                }
            }
            AuthScheme::Bearer { .. } => {
                if let Some(token) = resolver.get_api_key(&service_id) {
                    let mut headers = HashMap::new();
                    headers.insert("Authorization".to_string(), format!("Bearer {token}"));
                    return Ok(ResolvedAuth { headers, oauth: None });
                }
            }
            AuthScheme::OAuth2 {
                token_url, scopes, ..
            } => {
                if let Some((client_id, client_secret)) = resolver.get_oauth_pair(&service_id) {
                    let token = acquire_token(
                        http,
                        token_cache,
                        &service_id,
                        token_url,
                        &client_id,
                        &client_secret,
                        scopes.as_deref(),
                        oauth_safety_margin,
                    )
                    .await?;
                    let mut headers = HashMap::new();
                    headers.insert("Authorization".to_string(), format!("Bearer {token}"));
                    return Ok(ResolvedAuth {
                        headers,
                        oauth: Some((service_id, token_url.clone())),
                    });
                }
            }
        }
    }

    Err(A2AError::no_usable_auth_scheme())
}

#[allow(clippy::too_many_arguments)]
async fn acquire_token(
    http: &reqwest::Client,
    token_cache: &TokenCache,
    service_id: &str,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    scopes: Option<&[String]>,
    safety_margin: Duration,
) -> A2AResult<String> {
    if let Some(token) = token_cache.get(service_id, token_url) {
        return Ok(token);
    }

    let mut form = vec![
        ("grant_type", "client_credentials".to_string()),
        ("client_id", client_id.to_string()),
        ("client_secret", client_secret.to_string()),
    ];
    if let Some(scopes) = scopes {
        if !scopes.is_empty() {
            form.push(("scope", scopes.join(" ")));
        }
    }

    let response = http
        .post(token_url)
        .form(&form)
        .send()
        .await
        .map_err(|e| A2AError::Auth {
            message: format!("OAuth2 token exchange request failed: {e}"),
        })?;

    if !response.status().is_success() {
        return Err(A2AError::Auth {
            message: format!(
                "OAuth2 token exchange returned HTTP {}",
                response.status().as_u16()
            ),
        });
    }

    let parsed: TokenResponse = response.json().await.map_err(|e| A2AError::Auth {
        message: format!("OAuth2 token response was not valid JSON: {e}"),
    })?;

    let ttl_secs = parsed.expires_in.unwrap_or(DEFAULT_OAUTH_TOKEN_TTL_SECS).max(0) as u64;
    let ttl = Duration::from_secs(ttl_secs)
        .saturating_sub(safety_margin)
        .max(Duration::from_secs(1));

    token_cache.store(service_id, token_url, parsed.access_token.clone(), ttl);
    Ok(parsed.access_token)
}
