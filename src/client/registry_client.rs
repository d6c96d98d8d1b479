//! Registry Catalog read client (C8) — the read-only Agent Card catalog
//! search/lookup the core depends on when an agent is referenced by
//! catalog identifier rather than by URL (spec §4.8/§6).
//!
//! No teacher analog; grounded on the teacher's `reqwest::Client`
//! construction pattern in `client/transport.rs` and on `percent_encoding`
//! for tolerant URL-decoding/encoding of HRI path segments.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::error::{A2AError, A2AResult};
use crate::types::AgentCard;
use crate::utils::constants::{REGISTRY_DEFAULT_LIMIT, REGISTRY_MAX_LIMIT};

/// One row of `GET /agent-cards` — a summarized [`AgentCard`] (spec §4.8).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCardSummary {
    pub id: String,
    pub human_readable_id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub has_tee: bool,
}

/// `GET /agent-cards` response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryListResponse {
    pub items: Vec<AgentCardSummary>,
    pub total: u64,
    pub limit: usize,
    pub offset: usize,
}

/// Filters for [`RegistryClient::list`]. All fields optional; an empty
/// `ListQuery` returns the first page unfiltered.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub tags: Vec<String>,
    pub has_tee: Option<bool>,
    pub tee_type: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Client for the registry's read path.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// `GET /agent-cards?search=&tags=&has_tee=&tee_type=&limit=&offset=`.
    /// `limit` is clamped to the registry's `REGISTRY_MAX_LIMIT` (spec §6).
    pub async fn list(&self, query: &ListQuery) -> A2AResult<RegistryListResponse> {
        let limit = query
            .limit
            .unwrap_or(REGISTRY_DEFAULT_LIMIT)
            .min(REGISTRY_MAX_LIMIT);
        let offset = query.offset.unwrap_or(0);

        let mut request = self
            .http
            .get(format!("{}/agent-cards", self.base_url))
            .query(&[("limit", limit.to_string()), ("offset", offset.to_string())]);

        if let Some(search) = &query.search {
            request = request.query(&[("search", search)]);
        }
        if !query.tags.is_empty() {
            request = request.query(&[("tags", query.tags.join(","))]);
        }
        if let Some(has_tee) = query.has_tee {
            request = request.query(&[("has_tee", has_tee.to_string())]);
        }
        if let Some(tee_type) = &query.tee_type {
            request = request.query(&[("tee_type", tee_type)]);
        }

        let response = request.send().await.map_err(connection_error)?;
        ensure_success(&response)?;

        response
            .json::<RegistryListResponse>()
            .await
            .map_err(|e| A2AError::Connection {
                message: format!("failed to parse registry list response: {e}"),
            })
    }

    /// `GET /agent-cards/by-id/<url-encoded-hri>` — HRI slashes are
    /// percent-encoded on the way out (spec §4.8's "HRI slashes must be
    /// accepted URL-encoded").
    pub async fn get_by_hri(&self, hri: &str) -> A2AResult<AgentCard> {
        let encoded = utf8_percent_encode(hri, NON_ALPHANUMERIC).to_string();
        let url = format!("{}/agent-cards/by-id/{}", self.base_url, encoded);
        self.fetch_card(&url).await
    }

    /// `GET /agent-cards/<uuid>`.
    pub async fn get_by_id(&self, id: &str) -> A2AResult<AgentCard> {
        let url = format!("{}/agent-cards/{}", self.base_url, id);
        self.fetch_card(&url).await
    }

    async fn fetch_card(&self, url: &str) -> A2AResult<AgentCard> {
        let response = self.http.get(url).send().await.map_err(connection_error)?;
        ensure_success(&response)?;
        let value: serde_json::Value = response.json().await.map_err(|e| A2AError::Connection {
            message: format!("failed to parse agent card response: {e}"),
        })?;
        AgentCard::from_dict(value)
    }
}

fn connection_error(e: reqwest::Error) -> A2AError {
    if e.is_timeout() {
        A2AError::Timeout {
            message: format!("registry request timed out: {e}"),
        }
    } else {
        A2AError::Connection {
            message: format!("registry request failed: {e}"),
        }
    }
}

fn ensure_success(response: &reqwest::Response) -> A2AResult<()> {
    if response.status().is_success() {
        Ok(())
    } else if response.status().as_u16() == 404 {
        Err(A2AError::Other("agent card not found in registry".to_string()))
    } else {
        Err(A2AError::Connection {
            message: format!("registry returned HTTP {}", response.status().as_u16()),
        })
    }
}
