//! A2A error types — the crate's single error taxonomy.
//!
//! Every subsystem (card loader, credential resolver, client, dispatcher,
//! task store) returns `A2AResult<T>`. JSON-RPC error codes are assigned via
//! [`A2AError::code`] for the variants that cross the wire as a JSON-RPC
//! error response; client-side-only variants (connection, timeout, auth)
//! never appear in a response body but still carry a code for logging.

use crate::types::JsonRpcError;

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 error codes
// ---------------------------------------------------------------------------

/// Invalid JSON was received.
pub const PARSE_ERROR: i64 = -32700;

/// The JSON sent is not a valid Request object.
pub const INVALID_REQUEST: i64 = -32600;

/// The method does not exist / is not available.
pub const METHOD_NOT_FOUND: i64 = -32601;

/// Invalid method parameter(s).
pub const INVALID_PARAMS: i64 = -32602;

/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i64 = -32603;

/// The requested task was not found. Reserved by the A2A wire protocol.
pub const TASK_NOT_FOUND: i64 = -32001;

/// A state-machine transition was rejected. Application error range.
pub const INVALID_TRANSITION: i64 = -32010;

/// A declared auth scheme had no usable credentials. Application error range.
pub const NO_USABLE_AUTH_SCHEME: i64 = -32011;

/// A single validation issue, scoped to the field path that failed.
///
/// `path` uses a dotted notation (`"capabilities.a2aVersion"`) so a caller
/// can map an issue back to the offending field without parsing the message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidationIssue {
    /// Dotted path to the offending field, empty for document-level issues.
    pub path: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl ValidationIssue {
    /// Build an issue for the given field path.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Unified error type for the AgentVault A2A core.
#[derive(Debug, Clone, thiserror::Error)]
pub enum A2AError {
    /// An Agent Card failed schema-driven validation (C1).
    #[error("card validation failed: {} issue(s)", issues.len())]
    CardValidation {
        /// Path-scoped list of everything wrong with the card.
        issues: Vec<ValidationIssue>,
    },

    /// An Agent Card could not be fetched from a URL (C1). Network details
    /// are redacted per spec — callers get a summary, not a raw transport
    /// error string.
    #[error("failed to fetch agent card: {message}")]
    CardFetch {
        /// Redacted, human-readable description of the failure.
        message: String,
    },

    /// The credential resolver's keychain backend failed during a `set_*`
    /// call, or is altogether unavailable when a caller required it (C2).
    #[error("credential management error: {message}")]
    KeyMgmt {
        /// Human-readable description of the failure.
        message: String,
    },

    /// Auth scheme selection or OAuth2 token exchange failed (C4).
    #[error("authentication error: {message}")]
    Auth {
        /// Human-readable description of the failure.
        message: String,
    },

    /// Transport-level connection failure (C4).
    #[error("connection error: {message}")]
    Connection {
        /// Human-readable description of the failure.
        message: String,
    },

    /// A call or stream exceeded its deadline (C4).
    #[error("request timed out: {message}")]
    Timeout {
        /// Human-readable description of the failure.
        message: String,
    },

    /// The remote agent returned a non-auth JSON-RPC error (C4).
    #[error("remote error {code}: {message}")]
    Remote {
        /// JSON-RPC error code returned by the remote agent.
        code: i64,
        /// Error message returned by the remote agent.
        message: String,
        /// Optional structured error data returned by the remote agent.
        data: Option<serde_json::Value>,
    },

    /// The requested task does not exist in the store (C6). Maps to -32001.
    #[error("task not found: {task_id}")]
    TaskNotFound {
        /// The task id that was looked up.
        task_id: String,
    },

    /// A state transition was attempted that the task's current state does
    /// not allow (C6, §4.6's transition table).
    #[error("task {task_id}: illegal transition {from} -> {to}")]
    InvalidTransition {
        /// The task the transition was attempted on.
        task_id: String,
        /// The state the task was in.
        from: String,
        /// The state the caller tried to move it to.
        to: String,
    },

    /// Request parameters failed to decode against a handler's declared
    /// shape (C5). Maps to -32602.
    #[error("validation error: {message}")]
    Validation {
        /// Human-readable description of the failure.
        message: String,
    },

    /// A non-fatal, in-stream SSE error (C4/C3). Carried as an
    /// [`crate::types::A2AEvent::StreamError`] value rather than returned
    /// from a fallible function — it does not by itself end iteration.
    #[error("stream error {code}: {message}")]
    Stream {
        /// Application-defined error code.
        code: String,
        /// Human-readable description.
        message: String,
        /// Optional structured detail payload.
        details: Option<serde_json::Value>,
    },

    /// Unexpected server-side failure (C5). Maps to -32603; message is
    /// sanitized by the caller before this variant is constructed.
    #[error("internal error: {message}")]
    Internal {
        /// Sanitized, human-readable description.
        message: String,
    },

    /// Malformed JSON was received where a JSON-RPC envelope or credential
    /// file was expected.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// Catch-all for errors that don't fit another category.
    #[error("{0}")]
    Other(String),
}

/// Convenience result type for A2A operations.
pub type A2AResult<T> = Result<T, A2AError>;

impl A2AError {
    /// Build a [`A2AError::CardValidation`] from a single issue.
    pub fn card_validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CardValidation {
            issues: vec![ValidationIssue::new(path, message)],
        }
    }

    /// Build a [`A2AError::TaskNotFound`].
    pub fn task_not_found(task_id: impl Into<String>) -> Self {
        Self::TaskNotFound {
            task_id: task_id.into(),
        }
    }

    /// Build a [`A2AError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Build an [`A2AError::Auth`] for "no declared scheme has usable
    /// credentials" (spec §4.4's `AuthError("no-usable-scheme")`).
    pub fn no_usable_auth_scheme() -> Self {
        Self::Auth {
            message: "no-usable-scheme".to_string(),
        }
    }

    /// Returns the JSON-RPC error code for this variant.
    ///
    /// Client-only variants that never cross the wire as a JSON-RPC error
    /// response still get a representative code, for consistent logging.
    pub fn code(&self) -> i64 {
        match self {
            A2AError::CardValidation { .. }
            | A2AError::CardFetch { .. }
            | A2AError::KeyMgmt { .. }
            | A2AError::Auth { .. }
            | A2AError::Connection { .. }
            | A2AError::Timeout { .. } => INTERNAL_ERROR,
            A2AError::Remote { code, .. } => *code,
            A2AError::TaskNotFound { .. } => TASK_NOT_FOUND,
            A2AError::InvalidTransition { .. } => INVALID_TRANSITION,
            A2AError::Validation { .. } => INVALID_PARAMS,
            A2AError::Stream { .. } => INTERNAL_ERROR,
            A2AError::Internal { .. } => INTERNAL_ERROR,
            A2AError::InvalidJson(_) => PARSE_ERROR,
            A2AError::Other(_) => INTERNAL_ERROR,
        }
    }
}

impl From<A2AError> for JsonRpcError {
    fn from(err: A2AError) -> Self {
        let code = err.code();
        let message = err.to_string();
        let data = match &err {
            A2AError::Remote { data, .. } => data.clone(),
            A2AError::CardValidation { issues } => serde_json::to_value(issues).ok(),
            _ => None,
        };
        JsonRpcError {
            code,
            message,
            data,
        }
    }
}

impl From<serde_json::Error> for A2AError {
    fn from(err: serde_json::Error) -> Self {
        A2AError::InvalidJson(err.to_string())
    }
}
