//! Agent Card Loader (C1): `from_file` and `from_url` against real I/O.

mod common;

use std::io::Write;
use std::sync::Arc;

use agentvault_a2a::config::AgentVaultConfig;
use agentvault_a2a::error::A2AError;
use agentvault_a2a::types::AgentCard;

use common::EchoAgent;

#[test]
fn from_file_reads_and_validates_a_card_on_disk() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{
            "schema_version": "1.0",
            "human_readable_id": "acme/writer",
            "name": "Writer",
            "description": "Writes things.",
            "provider": {{"name": "Acme"}},
            "agent_version": "2.1.0",
            "url": "https://acme.example/a2a",
            "capabilities": {{"a2a_version": "1.0"}},
            "auth_schemes": [{{"type": "none"}}]
        }}"#
    )
    .unwrap();
    file.flush().unwrap();

    let card = AgentCard::from_file(file.path()).unwrap();
    assert_eq!(card.human_readable_id, "acme/writer");
    assert_eq!(card.agent_version, "2.1.0");
}

#[test]
fn from_file_surfaces_every_validation_issue_at_once() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{
            "schema_version": "",
            "human_readable_id": "Not Namespaced!",
            "name": "",
            "description": "d",
            "provider": {{"name": "Acme"}},
            "agent_version": "1.0.0",
            "url": "ftp://acme.example/a2a",
            "capabilities": {{"a2a_version": "1.0"}},
            "auth_schemes": []
        }}"#
    )
    .unwrap();
    file.flush().unwrap();

    let err = AgentCard::from_file(file.path()).unwrap_err();
    match err {
        A2AError::CardValidation { issues } => assert!(issues.len() >= 3),
        other => panic!("expected CardValidation, got {other:?}"),
    }
}

#[tokio::test]
async fn from_url_fetches_the_hosted_card() {
    let (base_url, _card, _handle) = common::start_test_server(Arc::new(EchoAgent)).await;
    let config = AgentVaultConfig::default();

    let card = AgentCard::from_url(&format!("{base_url}/.well-known/agent-card.json"), &config)
        .await
        .unwrap();
    assert_eq!(card.human_readable_id, "test/echo");
}

#[tokio::test]
async fn from_url_rejects_a_non_success_response() {
    let (base_url, _card, _handle) = common::start_test_server(Arc::new(EchoAgent)).await;
    let config = AgentVaultConfig::default();

    let err = AgentCard::from_url(&format!("{base_url}/does-not-exist"), &config)
        .await
        .unwrap_err();
    assert!(matches!(err, A2AError::CardFetch { .. }));
}
