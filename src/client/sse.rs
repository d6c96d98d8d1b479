//! Server-Sent Events parsing for the A2A client's `receive_messages` (C4).
//!
//! A small state machine on the read side: accumulate `event:`/`data:`
//! lines until a blank line, then emit one [`A2AEvent`] (spec §9). Grounded
//! on the teacher's `parse_sse_stream`/`parse_sse_line` shape in
//! `client/sse.rs`, reworked to track the `event:` name (the wire dispatch
//! key, spec §6) instead of assuming every `data:` line is self-describing,
//! and to enforce the idle-read timeout from spec §4.4/§5.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::stream::Stream;
use tokio::sync::mpsc;

use crate::error::{A2AError, A2AResult};
use crate::types::{
    A2AEvent, StreamErrorEvent, TaskArtifactUpdateEvent, TaskMessageEvent, TaskStatusUpdateEvent,
};

/// Accumulator for one in-progress SSE event.
#[derive(Default)]
struct PendingEvent {
    event_name: Option<String>,
    data_lines: Vec<String>,
}

impl PendingEvent {
    fn is_empty(&self) -> bool {
        self.event_name.is_none() && self.data_lines.is_empty()
    }

    /// Finalize into an [`A2AEvent`]. Unknown or malformed events become a
    /// [`A2AEvent::StreamError`] rather than aborting the stream (spec §4.4:
    /// "Unknown event names yield StreamError entries rather than aborting").
    fn finish(self) -> Option<A2AEvent> {
        if self.data_lines.is_empty() {
            return None;
        }
        let data = self.data_lines.join("\n");
        let name = self.event_name.as_deref().unwrap_or("message");
        // The wire default event name is `message`, treated as `task_message`.
        let name = if name == "message" { "task_message" } else { name };

        let value: serde_json::Value = match serde_json::from_str(&data) {
            Ok(v) => v,
            Err(e) => {
                return Some(A2AEvent::StreamError(StreamErrorEvent {
                    code: "invalid-json".to_string(),
                    message: format!("failed to parse SSE data as JSON: {e}"),
                    details: None,
                }));
            }
        };

        let event = match name {
            "task_status" => serde_json::from_value::<TaskStatusUpdateEvent>(value)
                .map(A2AEvent::TaskStatusUpdate),
            "task_message" => {
                serde_json::from_value::<TaskMessageEvent>(value).map(A2AEvent::TaskMessage)
            }
            "task_artifact" => serde_json::from_value::<TaskArtifactUpdateEvent>(value)
                .map(A2AEvent::TaskArtifactUpdate),
            "error" => {
                serde_json::from_value::<StreamErrorEvent>(value).map(A2AEvent::StreamError)
            }
            other => {
                return Some(A2AEvent::StreamError(StreamErrorEvent {
                    code: "unknown-event".to_string(),
                    message: format!("unrecognized SSE event name: {other}"),
                    details: None,
                }));
            }
        };

        Some(event.unwrap_or_else(|e| {
            A2AEvent::StreamError(StreamErrorEvent {
                code: "malformed-event".to_string(),
                message: format!("SSE `{name}` event failed to decode: {e}"),
                details: None,
            })
        }))
    }
}

/// A parsed stream of [`A2AEvent`]s from a `tasks/sendSubscribe` response.
///
/// Finite, not restartable (spec §4.4): once exhausted (the task reached a
/// terminal state, or the connection dropped), a new subscription requires
/// a fresh `receive_messages` call.
pub struct SseStream {
    receiver: mpsc::Receiver<A2AResult<A2AEvent>>,
    _task: tokio::task::JoinHandle<()>,
}

impl std::fmt::Debug for SseStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SseStream").finish_non_exhaustive()
    }
}

impl SseStream {
    pub(crate) fn from_response(response: reqwest::Response, idle_timeout: Duration) -> Self {
        let (tx, rx) = mpsc::channel(64);

        let task = tokio::spawn(async move {
            if let Err(e) = read_sse_body(response, &tx, idle_timeout).await {
                let _ = tx.send(Err(e)).await;
            }
        });

        Self {
            receiver: rx,
            _task: task,
        }
    }

    /// Pull the next event, or `None` once the stream has ended.
    pub async fn next(&mut self) -> Option<A2AResult<A2AEvent>> {
        self.receiver.recv().await
    }

    /// Adapt into a `futures::Stream` for use with stream combinators.
    pub fn into_stream(self) -> SseStreamAdapter {
        SseStreamAdapter {
            receiver: self.receiver,
            _task: self._task,
        }
    }
}

pub struct SseStreamAdapter {
    receiver: mpsc::Receiver<A2AResult<A2AEvent>>,
    _task: tokio::task::JoinHandle<()>,
}

impl Stream for SseStreamAdapter {
    type Item = A2AResult<A2AEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

async fn read_sse_body(
    response: reqwest::Response,
    tx: &mpsc::Sender<A2AResult<A2AEvent>>,
    idle_timeout: Duration,
) -> A2AResult<()> {
    use futures::StreamExt;

    let mut stream = response.bytes_stream();
    let mut buffer = String::new();
    let mut pending = PendingEvent::default();

    loop {
        let next = tokio::time::timeout(idle_timeout, stream.next()).await;
        let chunk_result = match next {
            Ok(Some(r)) => r,
            Ok(None) => break,
            Err(_) => {
                return Err(A2AError::Connection {
                    message: "SSE stream went idle past the read timeout".to_string(),
                });
            }
        };

        let chunk = chunk_result.map_err(|e| A2AError::Connection {
            message: format!("error reading SSE stream: {e}"),
        })?;
        let text = String::from_utf8_lossy(&chunk);
        buffer.push_str(&text);

        while let Some(newline_pos) = buffer.find('\n') {
            let line = buffer[..newline_pos].trim_end_matches('\r').to_string();
            buffer.drain(..=newline_pos);
            feed_line(&line, &mut pending, tx).await?;
        }
    }

    if !pending.is_empty() {
        if let Some(event) = pending.finish() {
            let _ = tx.send(Ok(event)).await;
        }
    }

    Ok(())
}

async fn feed_line(
    line: &str,
    pending: &mut PendingEvent,
    tx: &mpsc::Sender<A2AResult<A2AEvent>>,
) -> A2AResult<()> {
    if line.is_empty() {
        // Blank line = event boundary.
        let finished = std::mem::take(pending);
        if let Some(event) = finished.finish() {
            if tx.send(Ok(event)).await.is_err() {
                return Err(A2AError::Connection {
                    message: "SSE consumer dropped".to_string(),
                });
            }
        }
        return Ok(());
    }

    // Heartbeats are dispatcher-inserted `:`-prefixed comment lines (spec §9).
    if line.starts_with(':') {
        return Ok(());
    }

    if let Some(name) = line.strip_prefix("event:") {
        pending.event_name = Some(name.trim().to_string());
    } else if let Some(data) = line.strip_prefix("data:") {
        pending.data_lines.push(data.trim_start().to_string());
    }
    // `id:`/`retry:` and anything else: ignored, matching the teacher.

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_from_lines(lines: &[&str]) -> Option<A2AEvent> {
        let mut pending = PendingEvent::default();
        for line in lines {
            if line.is_empty() {
                break;
            }
            if let Some(name) = line.strip_prefix("event:") {
                pending.event_name = Some(name.trim().to_string());
            } else if let Some(data) = line.strip_prefix("data:") {
                pending.data_lines.push(data.trim_start().to_string());
            }
        }
        pending.finish()
    }

    #[test]
    fn default_event_name_is_task_message() {
        let event = event_from_lines(&[r#"data: {"task_id":"t1","message":{"role":"assistant","parts":[]},"timestamp":"2024-01-01T00:00:00Z"}"#]);
        assert!(matches!(event, Some(A2AEvent::TaskMessage(_))));
    }

    #[test]
    fn task_status_dispatches_by_event_name() {
        let event = event_from_lines(&[
            "event: task_status",
            r#"data: {"task_id":"t1","state":"WORKING","timestamp":"2024-01-01T00:00:00Z"}"#,
        ]);
        assert!(matches!(event, Some(A2AEvent::TaskStatusUpdate(_))));
    }

    #[test]
    fn unknown_event_name_yields_stream_error_not_none() {
        let event = event_from_lines(&["event: task_reticulated", r#"data: {}"#]);
        assert!(matches!(event, Some(A2AEvent::StreamError(_))));
    }

    #[test]
    fn invalid_json_yields_stream_error() {
        let event = event_from_lines(&["event: task_status", "data: {not json}"]);
        assert!(matches!(event, Some(A2AEvent::StreamError(_))));
    }

    #[test]
    fn no_data_lines_yields_nothing() {
        let event = event_from_lines(&["event: task_status"]);
        assert!(event.is_none());
    }
}
