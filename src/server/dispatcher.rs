//! A2A Server Dispatcher (C5) — JSON-RPC 2.0 method routing in front of an
//! [`AgentSkeleton`] (spec §4.5).
//!
//! Grounded on the teacher's `handle_jsonrpc` match-on-`method` shape in the
//! old `server/request_handler.rs`/`axum_integration.rs`, narrowed to the
//! spec's four methods and split out of the axum layer so it can be tested
//! without spinning up a router. Authentication is deliberately not this
//! module's concern (spec §4.5: "applied before the dispatcher... provided
//! by the host") — `axum_integration.rs` rejects unauthenticated requests
//! with HTTP 401 before a request ever reaches [`dispatch`].

use std::sync::Arc;

use serde_json::Value;

use crate::error::{A2AError, A2AResult, INVALID_REQUEST, METHOD_NOT_FOUND};
use crate::types::{
    JsonRpcId, JsonRpcRequest, JsonRpcResponse, TasksCancelParams, TasksCancelResult,
    TasksGetParams, TasksSendParams, TasksSendResult, TasksSendSubscribeParams,
};

use super::agent_skeleton::AgentSkeleton;
use super::task_store::TaskListener;

/// What dispatching a request produced. `tasks/sendSubscribe` is the one
/// method that never produces a `Response` on success — it hands back the
/// raw listener for the caller to frame as SSE (spec §4.5).
pub enum DispatchOutcome {
    Response(JsonRpcResponse),
    Stream(TaskListener),
}

/// Route one already-parsed JSON-RPC request into `skeleton`.
///
/// Malformed envelopes never reach here — the caller (the axum layer, or a
/// test) is responsible for JSON decoding and mapping a parse failure to
/// `-32700` before calling this. This function only validates the
/// `jsonrpc` field, the method name, and each method's own params shape.
pub async fn dispatch(skeleton: &Arc<AgentSkeleton>, request: JsonRpcRequest) -> DispatchOutcome {
    let id = request.id.clone();

    if request.jsonrpc != "2.0" {
        return DispatchOutcome::Response(JsonRpcResponse::error(
            id,
            INVALID_REQUEST,
            "jsonrpc must be \"2.0\"",
        ));
    }

    match request.method.as_str() {
        "tasks/send" => DispatchOutcome::Response(respond(id, handle_send(skeleton, request.params).await)),
        "tasks/get" => DispatchOutcome::Response(respond(id, handle_get(skeleton, request.params).await)),
        "tasks/cancel" => {
            DispatchOutcome::Response(respond(id, handle_cancel(skeleton, request.params).await))
        }
        "tasks/sendSubscribe" => match handle_subscribe(skeleton, request.params).await {
            Ok(listener) => DispatchOutcome::Stream(listener),
            Err(e) => DispatchOutcome::Response(JsonRpcResponse::from_a2a_error(id, e)),
        },
        other => DispatchOutcome::Response(JsonRpcResponse::error(
            id,
            METHOD_NOT_FOUND,
            format!("method not found: {other}"),
        )),
    }
}

fn respond(id: Option<JsonRpcId>, result: A2AResult<Value>) -> JsonRpcResponse {
    match result {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::from_a2a_error(id, e),
    }
}

fn invalid_params(e: impl std::fmt::Display) -> A2AError {
    A2AError::validation(format!("invalid params: {e}"))
}

async fn handle_send(skeleton: &Arc<AgentSkeleton>, params: Value) -> A2AResult<Value> {
    let params: TasksSendParams = serde_json::from_value(params).map_err(invalid_params)?;
    let task_id = skeleton
        .on_send(params.id, params.message, params.webhook_url, None)
        .await?;
    serde_json::to_value(TasksSendResult { id: task_id }).map_err(A2AError::from)
}

async fn handle_get(skeleton: &Arc<AgentSkeleton>, params: Value) -> A2AResult<Value> {
    let params: TasksGetParams = serde_json::from_value(params).map_err(invalid_params)?;
    let task = skeleton.on_get(&params.id).await?;
    serde_json::to_value(task).map_err(A2AError::from)
}

async fn handle_cancel(skeleton: &Arc<AgentSkeleton>, params: Value) -> A2AResult<Value> {
    let params: TasksCancelParams = serde_json::from_value(params).map_err(invalid_params)?;
    let success = skeleton.on_cancel(&params.id).await?;
    serde_json::to_value(TasksCancelResult {
        success,
        message: None,
    })
    .map_err(A2AError::from)
}

async fn handle_subscribe(
    skeleton: &Arc<AgentSkeleton>,
    params: Value,
) -> A2AResult<TaskListener> {
    let params: TasksSendSubscribeParams =
        serde_json::from_value(params).map_err(invalid_params)?;
    skeleton.on_subscribe(&params.id).await
}
