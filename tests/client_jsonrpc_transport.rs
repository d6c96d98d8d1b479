//! `JsonRpcTransport` (C4) against a minimal mock HTTP endpoint — the
//! status-code mapping that the happy-path `client_server_integration`
//! tests never exercise (401, a generic 5xx, and a malformed response body).

use std::collections::HashMap;
use std::time::Duration;

use axum::response::IntoResponse;
use axum::routing::post;
use axum::{http::StatusCode, Router};

use agentvault_a2a::client::{JsonRpcTransport, Transport};
use agentvault_a2a::error::A2AError;
use agentvault_a2a::types::{JsonRpcRequest, JsonRpcResponse};

async fn start_mock(status: StatusCode, body: &'static str) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route(
        "/a2a",
        post(move || async move { (status, body).into_response() }),
    );
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    format!("http://{addr}/a2a")
}

fn request() -> JsonRpcRequest {
    JsonRpcRequest::new(1i64, "tasks/get", serde_json::json!({"id": "x"}))
}

#[tokio::test]
async fn unauthorized_response_maps_to_auth_error() {
    let url = start_mock(StatusCode::UNAUTHORIZED, "").await;
    let transport = JsonRpcTransport::new(url, Duration::from_secs(5));

    let err = transport.send(&request(), &HashMap::new()).await.unwrap_err();
    assert!(matches!(err, A2AError::Auth { .. }));
}

#[tokio::test]
async fn server_error_maps_to_connection_error() {
    let url = start_mock(StatusCode::INTERNAL_SERVER_ERROR, "").await;
    let transport = JsonRpcTransport::new(url, Duration::from_secs(5));

    let err = transport.send(&request(), &HashMap::new()).await.unwrap_err();
    assert!(matches!(err, A2AError::Connection { .. }));
}

#[tokio::test]
async fn malformed_body_fails_to_decode() {
    let url = start_mock(StatusCode::OK, "not json").await;
    let transport = JsonRpcTransport::new(url, Duration::from_secs(5));

    let err = transport.send(&request(), &HashMap::new()).await.unwrap_err();
    assert!(matches!(err, A2AError::InvalidJson(_)));
}

#[tokio::test]
async fn successful_response_decodes() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route(
        "/a2a",
        post(|| async {
            axum::Json(JsonRpcResponse::success(
                Some(agentvault_a2a::types::JsonRpcId::Number(1)),
                serde_json::json!({"id": "task-1"}),
            ))
        }),
    );
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let transport = JsonRpcTransport::new(format!("http://{addr}/a2a"), Duration::from_secs(5));
    let response = transport.send(&request(), &HashMap::new()).await.unwrap();
    assert!(response.error.is_none());
    assert_eq!(response.result.unwrap()["id"], "task-1");
}
