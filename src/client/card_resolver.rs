//! Agent Card Loader (C1) — the `from_url` constructor.
//!
//! `from_file`/`from_dict` live in `card.rs` and need no network access;
//! `from_url` needs `reqwest`, so it lives here behind the `client`
//! feature. Grounded on the teacher's `reqwest::Client` builder usage in
//! `transport.rs` for timeout/redirect configuration.

use std::time::Duration;

use reqwest::redirect::Policy;

use crate::config::AgentVaultConfig;
use crate::error::{A2AError, A2AResult};
use crate::types::AgentCard;

impl AgentCard {
    /// Fetch and validate an agent card from a URL.
    ///
    /// Times out after `config.card_fetch_timeout` and follows at most
    /// `config.redirect_limit` redirects, refusing to hop across schemes
    /// (spec §4.1).
    pub async fn from_url(url: &str, config: &AgentVaultConfig) -> A2AResult<Self> {
        let client = build_fetch_client(url, config)?;

        let response = client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| A2AError::CardFetch {
                message: if e.is_timeout() {
                    format!("timed out fetching agent card from {url}")
                } else if e.is_connect() {
                    format!("failed to connect to {url}")
                } else {
                    "failed to fetch agent card".to_string()
                },
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(A2AError::CardFetch {
                message: format!("agent card endpoint returned HTTP {}", status.as_u16()),
            });
        }

        let bytes = response.bytes().await.map_err(|_| A2AError::CardFetch {
            message: "failed to read agent card response body".to_string(),
        })?;

        let value: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| A2AError::CardValidation {
                issues: vec![crate::error::ValidationIssue::new(
                    "",
                    format!("response body is not valid JSON: {e}"),
                )],
            })?;

        AgentCard::from_dict(value)
    }
}

fn build_fetch_client(url: &str, config: &AgentVaultConfig) -> A2AResult<reqwest::Client> {
    let scheme = url::Url::parse(url)
        .map(|u| u.scheme().to_string())
        .map_err(|e| A2AError::CardFetch {
            message: format!("invalid URL: {e}"),
        })?;

    let redirect_limit = config.redirect_limit;
    let policy = Policy::custom(move |attempt| {
        if attempt.previous().len() >= redirect_limit {
            return attempt.error("too many redirects");
        }
        match attempt.url().scheme() == scheme {
            true => attempt.follow(),
            false => attempt.error("redirect changed scheme"),
        }
    });

    reqwest::Client::builder()
        .timeout(config.card_fetch_timeout.max(Duration::from_millis(1)))
        .redirect(policy)
        .build()
        .map_err(|e| A2AError::CardFetch {
            message: format!("failed to build HTTP client: {e}"),
        })
}
