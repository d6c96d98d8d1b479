//! Layered credential storage conventions (spec §4.2/§6).
//!
//! Each source snapshots its own view of the world at construction (file
//! and environment) or queries on demand (keychain); [`super::resolver`]
//! owns the priority ordering and caching across sources.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{A2AError, A2AResult};

/// Which layer a resolved credential came from (spec §4.2 `source_of`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSourceKind {
    File,
    Env,
    Keychain,
}

impl CredentialSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialSourceKind::File => "file",
            CredentialSourceKind::Env => "env",
            CredentialSourceKind::Keychain => "keychain",
        }
    }
}

/// What a single source knows about one `service_id`. Any subset of the
/// three fields may be populated; callers only trust the combination they
/// asked for (`get_api_key` ignores the oauth fields and vice versa).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialRecord {
    pub api_key: Option<String>,
    pub oauth_client_id: Option<String>,
    pub oauth_client_secret: Option<String>,
}

impl CredentialRecord {
    fn merge(&mut self, other: CredentialRecord) {
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.oauth_client_id.is_some() {
            self.oauth_client_id = other.oauth_client_id;
        }
        if other.oauth_client_secret.is_some() {
            self.oauth_client_secret = other.oauth_client_secret;
        }
    }
}

/// Environment-variable credential source, snapshotted once at
/// construction (spec §4.2 — "env and file are snapshotted at
/// construction").
#[derive(Debug, Clone)]
pub struct EnvSource {
    records: HashMap<String, CredentialRecord>,
}

impl EnvSource {
    /// Scan the current process environment for `<prefix>_KEY_<ID>`,
    /// `<prefix>_OAUTH_<ID>_CLIENT_ID`, `<prefix>_OAUTH_<ID>_CLIENT_SECRET`.
    pub fn snapshot(prefix: &str) -> Self {
        let mut records: HashMap<String, CredentialRecord> = HashMap::new();
        let key_prefix = format!("{prefix}_KEY_");
        let oauth_prefix = format!("{prefix}_OAUTH_");

        for (var, value) in std::env::vars() {
            if let Some(id) = var.strip_prefix(&key_prefix) {
                records
                    .entry(id.to_lowercase())
                    .or_default()
                    .api_key = Some(value);
            } else if let Some(rest) = var.strip_prefix(&oauth_prefix) {
                if let Some(id) = rest.strip_suffix("_CLIENT_ID") {
                    records
                        .entry(id.to_lowercase())
                        .or_default()
                        .oauth_client_id = Some(value);
                } else if let Some(id) = rest.strip_suffix("_CLIENT_SECRET") {
                    records
                        .entry(id.to_lowercase())
                        .or_default()
                        .oauth_client_secret = Some(value);
                }
            }
        }

        Self { records }
    }

    pub fn get(&self, service_id: &str) -> Option<&CredentialRecord> {
        self.records.get(service_id)
    }
}

/// File-backed credential source — either `.env`-style (`KEY=value` lines)
/// or a JSON object keyed by `service_id` (spec §6).
#[derive(Debug, Clone)]
pub struct FileSource {
    records: HashMap<String, CredentialRecord>,
}

impl FileSource {
    /// Load and parse a credential file, auto-detecting JSON vs. flat
    /// `.env` syntax by trying JSON first (a flat file is never valid
    /// JSON unless it's literally one `key=value` pair, which JSON
    /// parsing would reject anyway).
    pub fn load(path: &Path, env_prefix: &str) -> A2AResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            A2AError::Other(format!("failed to read credential file {:?}: {e}", path))
        })?;

        if let Ok(json) = serde_json::from_str::<serde_json::Value>(&contents) {
            return Self::from_json(&json);
        }

        Ok(Self::from_env_syntax(&contents, env_prefix))
    }

    fn from_json(value: &serde_json::Value) -> A2AResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| A2AError::InvalidJson("credential file must be a JSON object".into()))?;

        let mut records = HashMap::new();
        for (service_id, entry) in object {
            let mut record = CredentialRecord::default();
            match entry {
                serde_json::Value::String(s) => record.api_key = Some(s.clone()),
                serde_json::Value::Object(obj) => {
                    if let Some(key) = obj.get("apiKey").and_then(|v| v.as_str()) {
                        record.api_key = Some(key.to_string());
                    }
                    if let Some(oauth) = obj.get("oauth").and_then(|v| v.as_object()) {
                        record.oauth_client_id = oauth
                            .get("clientId")
                            .and_then(|v| v.as_str())
                            .map(str::to_string);
                        record.oauth_client_secret = oauth
                            .get("clientSecret")
                            .and_then(|v| v.as_str())
                            .map(str::to_string);
                    }
                }
                _ => continue,
            }
            records.insert(service_id.to_lowercase(), record);
        }

        Ok(Self { records })
    }

    /// Parse `.env`-style lines: `KEY=VALUE`, `#` comments, blank lines
    /// ignored. Recognizes the same prefixed variable names as
    /// [`EnvSource`], plus the bare `<id>=value` flat form for API keys.
    fn from_env_syntax(contents: &str, prefix: &str) -> Self {
        let mut records: HashMap<String, CredentialRecord> = HashMap::new();
        let key_prefix = format!("{prefix}_KEY_");
        let oauth_prefix = format!("{prefix}_OAUTH_");

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim().to_string();

            if let Some(id) = key.strip_prefix(&key_prefix) {
                records.entry(id.to_lowercase()).or_default().api_key = Some(value);
            } else if let Some(rest) = key.strip_prefix(&oauth_prefix) {
                if let Some(id) = rest.strip_suffix("_CLIENT_ID") {
                    records
                        .entry(id.to_lowercase())
                        .or_default()
                        .oauth_client_id = Some(value);
                } else if let Some(id) = rest.strip_suffix("_CLIENT_SECRET") {
                    records
                        .entry(id.to_lowercase())
                        .or_default()
                        .oauth_client_secret = Some(value);
                }
            } else {
                // Bare `<id>=value` flat form — API key only.
                records
                    .entry(key.to_lowercase())
                    .or_default()
                    .merge(CredentialRecord {
                        api_key: Some(value),
                        ..Default::default()
                    });
            }
        }

        Self { records }
    }

    pub fn get(&self, service_id: &str) -> Option<&CredentialRecord> {
        self.records.get(service_id)
    }
}
