//! JSON-RPC over HTTPS transport for the A2A client (C4).
//!
//! Grounded on the teacher's `JsonRpcTransport`/`Transport` shape in
//! `client/transport.rs`: a thin `reqwest`-backed sender, reworked to carry
//! this crate's `JsonRpcRequest`/`JsonRpcResponse` envelope and auth headers
//! instead of the teacher's.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{A2AError, A2AResult};
use crate::types::{JsonRpcRequest, JsonRpcResponse};

use super::sse::SseStream;

/// Transport abstraction for issuing A2A JSON-RPC calls.
///
/// Exists so the client can be tested against an in-process fake without a
/// real HTTP round-trip (see `tests/client_*`).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a unary JSON-RPC request, headers included, and parse the
    /// JSON-RPC response envelope.
    async fn send(&self, request: &JsonRpcRequest, headers: &HashMap<String, String>) -> A2AResult<JsonRpcResponse>;

    /// Send `tasks/sendSubscribe` and open the resulting `text/event-stream`
    /// response (spec §4.4 — the response body is *not* JSON-RPC).
    async fn send_stream(
        &self,
        request: &JsonRpcRequest,
        headers: &HashMap<String, String>,
        idle_timeout: Duration,
    ) -> A2AResult<SseStream>;
}

/// `reqwest`-backed [`Transport`] implementation — one instance per A2A
/// endpoint URL.
#[derive(Debug, Clone)]
pub struct JsonRpcTransport {
    client: reqwest::Client,
    url: String,
    call_timeout: Duration,
}

impl JsonRpcTransport {
    /// Build a transport targeting `url` (the agent card's `url` field,
    /// conventionally ending in `/a2a`).
    pub fn new(url: impl Into<String>, call_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            call_timeout,
        }
    }

    /// Build a transport around a caller-supplied `reqwest::Client` (e.g.
    /// one sharing a connection pool or custom TLS config across agents).
    pub fn with_client(url: impl Into<String>, client: reqwest::Client, call_timeout: Duration) -> Self {
        Self {
            client,
            url: url.into(),
            call_timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn header_map(headers: &HashMap<String, String>) -> A2AResult<HeaderMap> {
        let mut map = HeaderMap::new();
        for (key, value) in headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| A2AError::Connection { message: format!("invalid header name {key}: {e}") })?;
            let val = HeaderValue::from_str(value)
                .map_err(|e| A2AError::Connection { message: format!("invalid header value for {key}: {e}") })?;
            map.insert(name, val);
        }
        Ok(map)
    }
}

#[async_trait]
impl Transport for JsonRpcTransport {
    async fn send(&self, request: &JsonRpcRequest, headers: &HashMap<String, String>) -> A2AResult<JsonRpcResponse> {
        let body = serde_json::to_vec(request)?;

        let response = self
            .client
            .post(&self.url)
            .timeout(self.call_timeout)
            .header("Content-Type", "application/json")
            .headers(Self::header_map(headers)?)
            .body(body)
            .send()
            .await
            .map_err(|e| classify_send_error(e, &self.url))?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(A2AError::Auth {
                message: "agent returned 401 Unauthorized".to_string(),
            });
        }
        if !status.is_success() {
            return Err(A2AError::Connection {
                message: format!("agent returned HTTP {}", status.as_u16()),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| A2AError::Connection { message: format!("failed to read response body: {e}") })?;

        let rpc_response: JsonRpcResponse = serde_json::from_slice(&bytes)?;
        Ok(rpc_response)
    }

    async fn send_stream(
        &self,
        request: &JsonRpcRequest,
        headers: &HashMap<String, String>,
        idle_timeout: Duration,
    ) -> A2AResult<SseStream> {
        let body = serde_json::to_vec(request)?;

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .headers(Self::header_map(headers)?)
            .body(body)
            .send()
            .await
            .map_err(|e| classify_send_error(e, &self.url))?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(A2AError::Auth {
                message: "agent returned 401 Unauthorized".to_string(),
            });
        }
        if !status.is_success() {
            return Err(A2AError::Connection {
                message: format!("agent returned HTTP {}", status.as_u16()),
            });
        }

        Ok(SseStream::from_response(response, idle_timeout))
    }
}

fn classify_send_error(err: reqwest::Error, url: &str) -> A2AError {
    if err.is_timeout() {
        A2AError::Timeout {
            message: format!("request to {url} timed out"),
        }
    } else {
        A2AError::Connection {
            message: format!("failed to reach {url}: {err}"),
        }
    }
}
