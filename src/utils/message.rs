//! Ergonomic helpers layered over [`Message`]'s constructors in `types.rs`.

use serde_json::Value;

use crate::types::Message;

/// Concatenated text content of a message (see [`Message::text_content`]).
pub fn get_message_text(message: &Message) -> String {
    message.text_content()
}

/// The message's `mcp_context` metadata entry, if present. Returned as an
/// opaque [`Value`] — core never interprets its `items` schema (spec §9).
pub fn get_mcp_context(message: &Message) -> Option<&Value> {
    message.metadata.as_ref()?.get("mcp_context")
}

/// Attach an `mcp_context` entry to a message's metadata, preserving any
/// other metadata keys already present.
pub fn with_mcp_context(mut message: Message, mcp_context: Value) -> Message {
    let meta = message
        .metadata
        .get_or_insert_with(|| Value::Object(Default::default()));
    if let Some(obj) = meta.as_object_mut() {
        obj.insert("mcp_context".to_string(), mcp_context);
    }
    message
}
