//! Helpers for reading an [`Artifact`]'s single content payload.

use serde_json::Value;
use uuid::Uuid;

use crate::types::Artifact;

/// `content`, as a string, when it's a JSON string value.
///
/// Returns `None` for URI-backed artifacts or non-string content — callers
/// that need the raw [`Value`] should match on `artifact.content` directly.
pub fn artifact_text(artifact: &Artifact) -> Option<&str> {
    artifact.content.as_ref()?.as_str()
}

/// Build a text artifact with a generated id.
pub fn new_text_artifact(text: impl Into<String>) -> Artifact {
    Artifact::with_content(
        Uuid::new_v4().to_string(),
        "text",
        Value::String(text.into()),
    )
}

/// Build a structured-data artifact with a generated id.
pub fn new_data_artifact(content: Value) -> Artifact {
    Artifact::with_content(Uuid::new_v4().to_string(), "data", content)
}
