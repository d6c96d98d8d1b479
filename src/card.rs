//! Agent Card Loader (C1) — schema-driven construction of [`AgentCard`]
//! from a file, an inline JSON value, or (via `client::card_resolver`,
//! behind the `client` feature) a URL.
//!
//! Grounded on the teacher's `builders::AgentCardBuilder` for field
//! coverage; the validation rules themselves come from spec §3/§4.1.

use std::path::Path;

use serde_json::Value;

use crate::error::{A2AError, A2AResult, ValidationIssue};
use crate::types::AgentCard;

impl AgentCard {
    /// Parse and validate an agent card from an in-memory JSON value.
    /// Unknown fields are ignored (forward compatibility, spec §4.1);
    /// missing required fields or an invalid `url`/`human_readable_id`
    /// produce a [`A2AError::CardValidation`] with every issue found, not
    /// just the first.
    pub fn from_dict(value: Value) -> A2AResult<Self> {
        let card: AgentCard =
            serde_json::from_value(value).map_err(|e| A2AError::CardValidation {
                issues: vec![ValidationIssue::new("", e.to_string())],
            })?;

        let issues = validate(&card);
        if issues.is_empty() {
            Ok(card)
        } else {
            Err(A2AError::CardValidation { issues })
        }
    }

    /// Read and parse an agent card from a `.json` file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> A2AResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| A2AError::Other(format!("failed to read agent card {:?}: {e}", path)))?;
        let value: Value = serde_json::from_str(&contents)?;
        Self::from_dict(value)
    }

    /// Serialize back to a plain JSON value — `from_dict(card.to_dict())`
    /// round-trips for any validated card (spec §8).
    pub fn to_dict(&self) -> Value {
        serde_json::to_value(self).expect("AgentCard always serializes")
    }
}

fn validate(card: &AgentCard) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if card.schema_version.trim().is_empty() {
        issues.push(ValidationIssue::new("schema_version", "must not be empty"));
    }
    if card.name.trim().is_empty() {
        issues.push(ValidationIssue::new("name", "must not be empty"));
    }
    if card.description.trim().is_empty() {
        issues.push(ValidationIssue::new("description", "must not be empty"));
    }
    if card.agent_version.trim().is_empty() {
        issues.push(ValidationIssue::new("agent_version", "must not be empty"));
    }
    if card.capabilities.a2a_version.trim().is_empty() {
        issues.push(ValidationIssue::new(
            "capabilities.a2a_version",
            "must not be empty",
        ));
    }

    if !is_valid_hri(&card.human_readable_id) {
        issues.push(ValidationIssue::new(
            "human_readable_id",
            "must be a namespaced org/name identifier, lowercase, using only hyphens or underscores",
        ));
    }

    if !is_acceptable_url(&card.url) {
        issues.push(ValidationIssue::new(
            "url",
            "must use HTTPS unless the host is localhost or 127.0.0.1",
        ));
    }

    if card.auth_schemes.is_empty() {
        issues.push(ValidationIssue::new(
            "auth_schemes",
            "at least one auth scheme must be declared",
        ));
    }

    issues
}

fn is_valid_hri(hri: &str) -> bool {
    let Some((org, name)) = hri.split_once('/') else {
        return false;
    };
    if org.is_empty() || name.is_empty() {
        return false;
    }
    let is_valid_segment = |s: &str| {
        s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    };
    is_valid_segment(org) && is_valid_segment(name)
}

fn is_acceptable_url(url: &str) -> bool {
    let Ok(parsed) = url::Url::parse(url) else {
        return false;
    };
    match parsed.scheme() {
        "https" => true,
        "http" => matches!(parsed.host_str(), Some("localhost") | Some("127.0.0.1")),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AgentCapabilities, AgentProvider, AuthScheme};

    fn valid_card_json() -> Value {
        serde_json::json!({
            "schema_version": "1",
            "human_readable_id": "acme/echo-agent",
            "name": "Echo Agent",
            "description": "Echoes messages back",
            "provider": {"name": "Acme"},
            "agent_version": "1.0.0",
            "url": "https://echo.example.com/a2a",
            "capabilities": {"a2a_version": "0.1", "supported_message_parts": ["text"]},
            "auth_schemes": [{"type": "none"}],
            "skills": [],
            "tags": [],
        })
    }

    #[test]
    fn from_dict_accepts_a_valid_card() {
        let card = AgentCard::from_dict(valid_card_json()).unwrap();
        assert_eq!(card.human_readable_id, "acme/echo-agent");
        assert_eq!(card.auth_schemes.len(), 1);
    }

    #[test]
    fn from_dict_ignores_unknown_fields() {
        let mut json = valid_card_json();
        json["totally_unknown_field"] = serde_json::json!("whatever");
        assert!(AgentCard::from_dict(json).is_ok());
    }

    #[test]
    fn from_dict_rejects_non_https_public_url() {
        let mut json = valid_card_json();
        json["url"] = serde_json::json!("http://echo.example.com/a2a");
        let err = AgentCard::from_dict(json).unwrap_err();
        match err {
            A2AError::CardValidation { issues } => {
                assert!(issues.iter().any(|i| i.path == "url"));
            }
            other => panic!("expected CardValidation, got {other:?}"),
        }
    }

    #[test]
    fn from_dict_accepts_http_localhost() {
        let mut json = valid_card_json();
        json["url"] = serde_json::json!("http://localhost:8080/a2a");
        assert!(AgentCard::from_dict(json).is_ok());
    }

    #[test]
    fn from_dict_rejects_malformed_hri() {
        let mut json = valid_card_json();
        json["human_readable_id"] = serde_json::json!("NoSlashHere");
        let err = AgentCard::from_dict(json).unwrap_err();
        match err {
            A2AError::CardValidation { issues } => {
                assert!(issues.iter().any(|i| i.path == "human_readable_id"));
            }
            other => panic!("expected CardValidation, got {other:?}"),
        }
    }

    #[test]
    fn from_dict_rejects_no_auth_schemes() {
        let mut json = valid_card_json();
        json["auth_schemes"] = serde_json::json!([]);
        assert!(AgentCard::from_dict(json).is_err());
    }

    #[test]
    fn from_dict_reports_every_issue_at_once() {
        let mut json = valid_card_json();
        json["name"] = serde_json::json!("");
        json["auth_schemes"] = serde_json::json!([]);
        let err = AgentCard::from_dict(json).unwrap_err();
        match err {
            A2AError::CardValidation { issues } => assert!(issues.len() >= 2),
            other => panic!("expected CardValidation, got {other:?}"),
        }
    }

    #[test]
    fn to_dict_round_trips() {
        let card = AgentCard::from_dict(valid_card_json()).unwrap();
        let round_tripped = AgentCard::from_dict(card.to_dict()).unwrap();
        assert_eq!(card, round_tripped);
    }

    #[test]
    fn card_fields_support_all_auth_scheme_variants() {
        let card = AgentCard {
            schema_version: "1".into(),
            human_readable_id: "acme/multi".into(),
            name: "Multi".into(),
            description: "d".into(),
            provider: AgentProvider {
                name: "Acme".into(),
                url: None,
                contact: None,
            },
            agent_version: "1.0.0".into(),
            url: "https://example.com/a2a".into(),
            capabilities: AgentCapabilities {
                a2a_version: "0.1".into(),
                supported_message_parts: vec!["text".into()],
                supports_push_notifications: None,
                tee_details: None,
            },
            auth_schemes: vec![
                AuthScheme::None,
                AuthScheme::ApiKey {
                    service_identifier: Some("svc".into()),
                    header_name: "X-Api-Key".into(),
                },
                AuthScheme::Bearer {
                    service_identifier: Some("svc".into()),
                },
                AuthScheme::OAuth2 {
                    token_url: "https://example.com/token".into(),
                    service_identifier: Some("svc".into()),
                    scopes: Some(vec!["read".into()]),
                },
            ],
            skills: vec![],
            tags: vec![],
            privacy_policy_url: None,
            icon_url: None,
        };
        assert!(validate(&card).is_empty());
    }
}
