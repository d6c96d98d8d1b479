//! High-level A2A client (C4) — the five operations of spec §4.4, each
//! performing scheme selection/OAuth2 exchange through `auth.rs` and a
//! JSON-RPC round trip through `transport.rs`.
//!
//! Grounded on the teacher's `A2AClient` in the old `client/a2a_client.rs`
//! (method surface, error mapping shape), reworked to the spec's stateless
//! `(card, ..., resolver)`-per-call signatures rather than a client bound
//! to one agent at construction time — a caller here talks to many agents
//! through one client instance.

use serde_json::Value;

use crate::credentials::CredentialResolver;
use crate::error::{A2AError, A2AResult};
use crate::types::{
    AgentCard, JsonRpcId, JsonRpcRequest, JsonRpcResponse, Message, Task, TasksCancelParams,
    TasksCancelResult, TasksGetParams, TasksSendParams, TasksSendResult, TasksSendSubscribeParams,
};
use crate::config::AgentVaultConfig;
use crate::error::TASK_NOT_FOUND;

use super::auth::{resolve_auth, TokenCache};
use super::sse::SseStream;
use super::transport::{JsonRpcTransport, Transport};

/// Stateless client for driving tasks on any number of remote A2A agents.
///
/// One `A2AClient` holds the shared HTTP client and OAuth2 token cache;
/// every call takes the [`AgentCard`] and [`CredentialResolver`] it should
/// use for that particular agent (spec §4.4's per-call signatures).
pub struct A2AClient {
    http: reqwest::Client,
    config: AgentVaultConfig,
    token_cache: TokenCache,
}

impl A2AClient {
    pub fn new(config: AgentVaultConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            token_cache: TokenCache::new(),
        }
    }

    pub fn with_http_client(config: AgentVaultConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            config,
            token_cache: TokenCache::new(),
        }
    }

    /// `tasks/send` with no existing task id — creates a new task (spec
    /// §4.4's `initiate_task`).
    pub async fn initiate_task(
        &self,
        card: &AgentCard,
        initial_message: Message,
        resolver: &CredentialResolver,
        mcp_context: Option<Value>,
        webhook_url: Option<String>,
    ) -> A2AResult<String> {
        let message = attach_mcp_context(initial_message, mcp_context);
        let params = TasksSendParams {
            id: None,
            message,
            webhook_url,
        };
        let result: TasksSendResult = self
            .call(card, resolver, "tasks/send", serde_json::to_value(params)?, None)
            .await?;
        Ok(result.id)
    }

    /// `tasks/send` with an existing task id — feeds a follow-up message
    /// to a task already in progress.
    pub async fn send_message(
        &self,
        card: &AgentCard,
        task_id: &str,
        message: Message,
        resolver: &CredentialResolver,
        mcp_context: Option<Value>,
    ) -> A2AResult<bool> {
        let message = attach_mcp_context(message, mcp_context);
        let params = TasksSendParams {
            id: Some(task_id.to_string()),
            message,
            webhook_url: None,
        };
        let _result: TasksSendResult = self
            .call(
                card,
                resolver,
                "tasks/send",
                serde_json::to_value(params)?,
                Some(task_id),
            )
            .await?;
        Ok(true)
    }

    /// `tasks/get` — fetch a full task snapshot.
    pub async fn get_task_status(
        &self,
        card: &AgentCard,
        task_id: &str,
        resolver: &CredentialResolver,
    ) -> A2AResult<Task> {
        let params = TasksGetParams { id: task_id.to_string() };
        self.call(
            card,
            resolver,
            "tasks/get",
            serde_json::to_value(params)?,
            Some(task_id),
        )
        .await
    }

    /// `tasks/cancel` — request cancellation; returns whether the agent
    /// accepted the request.
    pub async fn terminate_task(
        &self,
        card: &AgentCard,
        task_id: &str,
        resolver: &CredentialResolver,
    ) -> A2AResult<bool> {
        let params = TasksCancelParams { id: task_id.to_string() };
        let result: TasksCancelResult = self
            .call(
                card,
                resolver,
                "tasks/cancel",
                serde_json::to_value(params)?,
                Some(task_id),
            )
            .await?;
        Ok(result.success)
    }

    /// `tasks/sendSubscribe` — open the SSE stream for a task's events.
    pub async fn receive_messages(
        &self,
        card: &AgentCard,
        task_id: &str,
        resolver: &CredentialResolver,
    ) -> A2AResult<SseStream> {
        let params = TasksSendSubscribeParams { id: task_id.to_string() };
        let request = JsonRpcRequest::new(
            JsonRpcId::String(uuid::Uuid::new_v4().to_string()),
            "tasks/sendSubscribe",
            serde_json::to_value(params)?,
        );

        let transport = JsonRpcTransport::new(card.url.clone(), self.config.call_timeout);
        let auth = resolve_auth(
            &card.auth_schemes,
            &card.human_readable_id,
            resolver,
            &self.http,
            &self.token_cache,
            self.config.oauth_safety_margin,
        )
        .await?;

        match transport
            .send_stream(&request, &auth.headers, self.config.sse_idle_timeout)
            .await
        {
            Ok(stream) => Ok(stream),
            Err(A2AError::Auth { .. }) if auth.oauth.is_some() => {
                let (service_id, token_url) = auth.oauth.unwrap();
                self.token_cache.invalidate(&service_id, &token_url);
                let retry_auth = resolve_auth(
                    &card.auth_schemes,
                    &card.human_readable_id,
                    resolver,
                    &self.http,
                    &self.token_cache,
                    self.config.oauth_safety_margin,
                )
                .await?;
                transport
                    .send_stream(&request, &retry_auth.headers, self.config.sse_idle_timeout)
                    .await
            }
            Err(e) => Err(e),
        }
    }

    /// Issue one JSON-RPC call, performing auth scheme selection and the
    /// spec's single 401-retry, then decode `result` into `T` (mapping
    /// `error` into the matching [`A2AError`] variant).
    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        card: &AgentCard,
        resolver: &CredentialResolver,
        method: &str,
        params: Value,
        task_id_hint: Option<&str>,
    ) -> A2AResult<T> {
        let transport = JsonRpcTransport::new(card.url.clone(), self.config.call_timeout);
        let request = JsonRpcRequest::new(
            JsonRpcId::String(uuid::Uuid::new_v4().to_string()),
            method,
            params,
        );

        let auth = resolve_auth(
            &card.auth_schemes,
            &card.human_readable_id,
            resolver,
            &self.http,
            &self.token_cache,
            self.config.oauth_safety_margin,
        )
        .await?;

        let response = match transport.send(&request, &auth.headers).await {
            Ok(resp) => resp,
            Err(A2AError::Auth { .. }) if auth.oauth.is_some() => {
                let (service_id, token_url) = auth.oauth.unwrap();
                self.token_cache.invalidate(&service_id, &token_url);
                let retry_auth = resolve_auth(
                    &card.auth_schemes,
                    &card.human_readable_id,
                    resolver,
                    &self.http,
                    &self.token_cache,
                    self.config.oauth_safety_margin,
                )
                .await?;
                transport.send(&request, &retry_auth.headers).await?
            }
            Err(e) => return Err(e),
        };

        decode_response(response, task_id_hint)
    }
}

fn decode_response<T: serde::de::DeserializeOwned>(
    response: JsonRpcResponse,
    task_id_hint: Option<&str>,
) -> A2AResult<T> {
    if let Some(err) = response.error {
        if err.code == TASK_NOT_FOUND {
            return Err(A2AError::TaskNotFound {
                task_id: task_id_hint.unwrap_or_default().to_string(),
            });
        }
        return Err(A2AError::Remote {
            code: err.code,
            message: err.message,
            data: err.data,
        });
    }

    let result = response.result.ok_or_else(|| A2AError::Connection {
        message: "JSON-RPC response carried neither result nor error".to_string(),
    })?;

    Ok(serde_json::from_value(result)?)
}

fn attach_mcp_context(mut message: Message, mcp_context: Option<Value>) -> Message {
    if let Some(context) = mcp_context {
        let meta = message
            .metadata
            .get_or_insert_with(|| Value::Object(Default::default()));
        if let Some(obj) = meta.as_object_mut() {
            obj.insert("mcp_context".to_string(), context);
        }
    }
    message
}
