//! Helpers for pulling typed content out of a [`Part`] sequence.

use crate::types::Part;
use serde_json::Value;

/// Concatenated text of every [`Part::Text`] in order.
///
/// # Example
///
/// ```
/// use agentvault_a2a::types::Part;
/// use agentvault_a2a::utils::get_text_parts;
///
/// let parts = vec![Part::text("Hello"), Part::text(" world")];
/// assert_eq!(get_text_parts(&parts), vec!["Hello", " world"]);
/// ```
pub fn get_text_parts(parts: &[Part]) -> Vec<&str> {
    parts
        .iter()
        .filter_map(|part| match part {
            Part::Text { content } => Some(content.as_str()),
            _ => None,
        })
        .collect()
}

/// Every [`Part::Data`] payload, in order, discarding the media type.
pub fn get_data_parts(parts: &[Part]) -> Vec<&Value> {
    parts
        .iter()
        .filter_map(|part| match part {
            Part::Data { content, .. } => Some(content),
            _ => None,
        })
        .collect()
}

/// Every [`Part::ArtifactRef`] as `(uri, media_type)` pairs, in order.
pub fn get_artifact_ref_parts(parts: &[Part]) -> Vec<(&str, &str)> {
    parts
        .iter()
        .filter_map(|part| match part {
            Part::ArtifactRef { uri, media_type } => Some((uri.as_str(), media_type.as_str())),
            _ => None,
        })
        .collect()
}

/// `Part`s whose `type` tag this build doesn't recognize, raw JSON intact.
pub fn get_unknown_parts(parts: &[Part]) -> Vec<&Value> {
    parts
        .iter()
        .filter_map(|part| match part {
            Part::Unknown { raw } => Some(raw),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slice_yields_empty_vecs() {
        let parts: Vec<Part> = vec![];
        assert!(get_text_parts(&parts).is_empty());
        assert!(get_data_parts(&parts).is_empty());
        assert!(get_artifact_ref_parts(&parts).is_empty());
    }

    #[test]
    fn filters_by_variant() {
        let parts = vec![
            Part::text("hi"),
            Part::data(serde_json::json!({"k": 1})),
            Part::artifact_ref("https://x/y", "text/plain"),
            Part::Unknown {
                raw: serde_json::json!({"type": "image", "uri": "x"}),
            },
        ];
        assert_eq!(get_text_parts(&parts), vec!["hi"]);
        assert_eq!(get_data_parts(&parts), vec![&serde_json::json!({"k": 1})]);
        assert_eq!(
            get_artifact_ref_parts(&parts),
            vec![("https://x/y", "text/plain")]
        );
        assert_eq!(get_unknown_parts(&parts).len(), 1);
    }
}
