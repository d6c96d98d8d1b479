//! Core A2A data types — Agent Cards, messages, tasks, events, and the
//! JSON-RPC envelope they travel in.
//!
//! Field names match the wire format directly (the AgentVault A2A wire
//! protocol uses `snake_case` JSON, unlike some sibling protocols), so most
//! types derive `Serialize`/`Deserialize` with no `rename_all` needed.

use std::fmt;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Agent Card (C1)
// ---------------------------------------------------------------------------

/// Immutable descriptor of a remote agent, loaded once and shared freely.
///
/// See [`crate::builders::AgentCardBuilder`] for fluent construction and
/// `AgentCard::from_file`/`from_url`/`from_dict` (in `client::card_loader`
/// and `client::card_resolver`) for the validating constructors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCard {
    pub schema_version: String,
    /// Namespaced `org/name` catalog key, lowercase, hyphens/underscores only.
    pub human_readable_id: String,
    pub name: String,
    pub description: String,
    pub provider: AgentProvider,
    pub agent_version: String,
    /// The A2A endpoint base. HTTPS unless the host is `localhost`/`127.0.0.1`.
    pub url: String,
    pub capabilities: AgentCapabilities,
    /// Ordered preference list; the client tries these in order.
    pub auth_schemes: Vec<AuthScheme>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_policy_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProvider {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCapabilities {
    pub a2a_version: String,
    #[serde(default)]
    pub supported_message_parts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supports_push_notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tee_details: Option<Value>,
}

/// One authentication scheme an agent advertises, in the order the client
/// should prefer them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AuthScheme {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "api_key")]
    ApiKey {
        #[serde(skip_serializing_if = "Option::is_none")]
        service_identifier: Option<String>,
        #[serde(default = "default_api_key_header")]
        header_name: String,
    },
    #[serde(rename = "bearer")]
    Bearer {
        #[serde(skip_serializing_if = "Option::is_none")]
        service_identifier: Option<String>,
    },
    #[serde(rename = "oauth2")]
    OAuth2 {
        token_url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        service_identifier: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        scopes: Option<Vec<String>>,
    },
}

fn default_api_key_header() -> String {
    "X-Api-Key".to_string()
}

impl AuthScheme {
    /// The `service_identifier` credentials are looked up under, if any.
    pub fn service_identifier(&self) -> Option<&str> {
        match self {
            AuthScheme::None => None,
            AuthScheme::ApiKey {
                service_identifier, ..
            }
            | AuthScheme::Bearer {
                service_identifier, ..
            }
            | AuthScheme::OAuth2 {
                service_identifier, ..
            } => service_identifier.as_deref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Messages & parts (C3)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        };
        f.write_str(s)
    }
}

/// An ordered, typed payload unit within a [`Message`].
///
/// Decoders tolerate unknown `type` tags, surfacing them as
/// [`Part::Unknown`] rather than failing — this keeps the crate forward
/// compatible with agents that speak a newer part vocabulary (spec §9).
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text {
        content: String,
    },
    Data {
        content: Value,
        media_type: String,
    },
    ArtifactRef {
        uri: String,
        media_type: String,
    },
    /// A part whose `type` tag this build doesn't recognize. The original
    /// JSON is retained verbatim so it survives a decode/re-encode cycle.
    Unknown {
        raw: Value,
    },
}

impl Part {
    pub fn text(content: impl Into<String>) -> Self {
        Part::Text {
            content: content.into(),
        }
    }

    pub fn data(content: Value) -> Self {
        Part::Data {
            content,
            media_type: "application/json".to_string(),
        }
    }

    pub fn artifact_ref(uri: impl Into<String>, media_type: impl Into<String>) -> Self {
        Part::ArtifactRef {
            uri: uri.into(),
            media_type: media_type.into(),
        }
    }
}

impl Serialize for Part {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;

        match self {
            Part::Text { content } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "text")?;
                map.serialize_entry("content", content)?;
                map.end()
            }
            Part::Data { content, media_type } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", "data")?;
                map.serialize_entry("content", content)?;
                map.serialize_entry("media_type", media_type)?;
                map.end()
            }
            Part::ArtifactRef { uri, media_type } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", "artifact-ref")?;
                map.serialize_entry("uri", uri)?;
                map.serialize_entry("media_type", media_type)?;
                map.end()
            }
            Part::Unknown { raw } => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Part {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let type_tag = value.get("type").and_then(Value::as_str).unwrap_or("");

        match type_tag {
            "text" => {
                let content = value
                    .get("content")
                    .and_then(Value::as_str)
                    .ok_or_else(|| DeError::missing_field("content"))?
                    .to_string();
                Ok(Part::Text { content })
            }
            "data" => {
                let content = value.get("content").cloned().unwrap_or(Value::Null);
                let media_type = value
                    .get("media_type")
                    .and_then(Value::as_str)
                    .unwrap_or("application/json")
                    .to_string();
                Ok(Part::Data { content, media_type })
            }
            "artifact-ref" => {
                let uri = value
                    .get("uri")
                    .and_then(Value::as_str)
                    .ok_or_else(|| DeError::missing_field("uri"))?
                    .to_string();
                let media_type = value
                    .get("media_type")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                Ok(Part::ArtifactRef { uri, media_type })
            }
            _ => Ok(Part::Unknown { raw: value }),
        }
    }
}

/// An ordered sequence of [`Part`]s from one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<Part>,
    /// Free-form metadata. May carry an `mcp_context` key, preserved
    /// structurally and never interpreted by core (spec §9).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Message {
    fn with_role_text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part::text(text)],
            metadata: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::with_role_text(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::with_role_text(Role::Assistant, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::with_role_text(Role::System, text)
    }

    /// Concatenate every `Text` part's content, in order.
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text { content } => Some(content.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

// ---------------------------------------------------------------------------
// Tasks & state machine (C6)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    Submitted,
    Working,
    InputRequired,
    Completed,
    Failed,
    Canceled,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Failed | TaskState::Canceled
        )
    }

    /// States this state may transition to directly (spec §4.6).
    pub fn allowed_transitions(&self) -> &'static [TaskState] {
        use TaskState::*;
        match self {
            Submitted => &[Working, Failed, Canceled],
            Working => &[InputRequired, Completed, Failed, Canceled],
            InputRequired => &[Working, Failed, Canceled],
            Completed | Failed | Canceled => &[],
        }
    }

    pub fn can_transition_to(&self, next: TaskState) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Submitted => "SUBMITTED",
            TaskState::Working => "WORKING",
            TaskState::InputRequired => "INPUT_REQUIRED",
            TaskState::Completed => "COMPLETED",
            TaskState::Failed => "FAILED",
            TaskState::Canceled => "CANCELED",
        };
        f.write_str(s)
    }
}

/// `{ id, type, content?, media_type?, uri? }` — exactly one of
/// `content`/`uri` carries the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl Artifact {
    pub fn with_content(id: impl Into<String>, artifact_type: impl Into<String>, content: Value) -> Self {
        Self {
            id: id.into(),
            artifact_type: artifact_type.into(),
            content: Some(content),
            media_type: None,
            uri: None,
        }
    }

    pub fn with_uri(
        id: impl Into<String>,
        artifact_type: impl Into<String>,
        uri: impl Into<String>,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            artifact_type: artifact_type.into(),
            content: None,
            media_type: Some(media_type.into()),
            uri: Some(uri.into()),
        }
    }

    /// Exactly one of `content`/`uri` must be set.
    pub fn is_valid(&self) -> bool {
        self.content.is_some() ^ self.uri.is_some()
    }
}

/// Server-side task entity. `task_id` is opaque and unique for the lifetime
/// of the owning store; `created_at` never changes after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub created_at: String,
    pub updated_at: String,
    pub state: TaskState,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

// ---------------------------------------------------------------------------
// Events (C3 / C6)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusUpdateEvent {
    pub task_id: String,
    pub state: TaskState,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMessageEvent {
    pub task_id: String,
    pub message: Message,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskArtifactUpdateEvent {
    pub task_id: String,
    pub artifact: Artifact,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamErrorEvent {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// One event on a task's notification stream. The SSE `event:` name (spec
/// §4.4/§6) is what selects the variant on the wire — these structs carry
/// only the `data:` payload, so no internal tag is needed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum A2AEvent {
    TaskStatusUpdate(TaskStatusUpdateEvent),
    TaskMessage(TaskMessageEvent),
    TaskArtifactUpdate(TaskArtifactUpdateEvent),
    /// Transport-level error surfaced in-stream; not a task state (spec §3).
    StreamError(StreamErrorEvent),
}

impl A2AEvent {
    /// The SSE `event:` name this event dispatches under (spec §6).
    pub fn event_name(&self) -> &'static str {
        match self {
            A2AEvent::TaskStatusUpdate(_) => "task_status",
            A2AEvent::TaskMessage(_) => "task_message",
            A2AEvent::TaskArtifactUpdate(_) => "task_artifact",
            A2AEvent::StreamError(_) => "error",
        }
    }

    pub fn task_id(&self) -> Option<&str> {
        match self {
            A2AEvent::TaskStatusUpdate(e) => Some(&e.task_id),
            A2AEvent::TaskMessage(e) => Some(&e.task_id),
            A2AEvent::TaskArtifactUpdate(e) => Some(&e.task_id),
            A2AEvent::StreamError(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 envelope (C3)
// ---------------------------------------------------------------------------

/// A JSON-RPC request/response id — either a string or a number. Absent
/// entirely for notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonRpcId {
    Number(i64),
    String(String),
}

impl From<i64> for JsonRpcId {
    fn from(n: i64) -> Self {
        JsonRpcId::Number(n)
    }
}

impl From<String> for JsonRpcId {
    fn from(s: String) -> Self {
        JsonRpcId::String(s)
    }
}

impl From<&str> for JsonRpcId {
    fn from(s: &str) -> Self {
        JsonRpcId::String(s.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonRpcId>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl JsonRpcRequest {
    pub fn new(id: impl Into<JsonRpcId>, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: Some(id.into()),
            method: method.into(),
            params,
        }
    }

    /// A request with no `id` — the server must not reply to it.
    pub fn notification(method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: None,
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<JsonRpcId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<JsonRpcId>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<JsonRpcId>, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    pub fn from_a2a_error(id: Option<JsonRpcId>, err: crate::error::A2AError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(err.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Method param/result shapes (spec §4.4/§4.5/§6)
// ---------------------------------------------------------------------------

/// `tasks/send` request params.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksSendParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksSendResult {
    pub id: String,
}

/// `tasks/get` request params.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksGetParams {
    pub id: String,
}

/// `tasks/cancel` request params.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksCancelParams {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksCancelResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `tasks/sendSubscribe` request params. The response is a raw SSE stream,
/// not a JSON-RPC envelope (spec §4.4/§4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksSendSubscribeParams {
    pub id: String,
}
