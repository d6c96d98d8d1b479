//! Credential Resolver (C2) — maps a `service_id` to API keys or OAuth2
//! client credential pairs from layered sources: file, then environment,
//! then OS keychain (spec §4.2).

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use tracing::warn;

use crate::config::AgentVaultConfig;
use crate::error::{A2AError, A2AResult};

use super::sources::{CredentialRecord, CredentialSourceKind, EnvSource, FileSource};

#[cfg(feature = "keychain")]
const KEYCHAIN_API_KEY_ACCOUNT_PREFIX: &str = "agentvault";
#[cfg(feature = "keychain")]
const KEYCHAIN_OAUTH_SERVICE_PREFIX: &str = "agentvault:oauth";

/// Resolves credentials for a `service_id`, trying file, then
/// environment, then (if enabled) the OS keychain, in that order.
///
/// File and environment views are snapshotted once at construction.
/// Keychain lookups are lazy and, once successful, cached for the
/// resolver's lifetime — repeated lookups for the same service don't
/// re-hit the OS keychain.
pub struct CredentialResolver {
    file: Option<FileSource>,
    env: EnvSource,
    keychain_enabled: bool,
    keychain_cache: Mutex<HashMap<String, CredentialRecord>>,
}

impl CredentialResolver {
    /// Build a resolver with only the environment source populated.
    pub fn new(config: &AgentVaultConfig) -> Self {
        Self {
            file: None,
            env: EnvSource::snapshot(&config.credential_env_prefix),
            keychain_enabled: config.keychain_enabled,
            keychain_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Load a credential file (`.env` syntax or JSON — auto-detected) to
    /// sit above the environment source in priority.
    pub fn with_file(mut self, path: impl AsRef<Path>, config: &AgentVaultConfig) -> A2AResult<Self> {
        self.file = Some(FileSource::load(path.as_ref(), &config.credential_env_prefix)?);
        Ok(self)
    }

    /// The API key for `service_id`, or `None` if absent from every
    /// enabled source. Lookup misses are non-fatal (spec §4.2).
    pub fn get_api_key(&self, service_id: &str) -> Option<String> {
        let service_id = service_id.to_lowercase();

        if let Some(key) = self
            .file
            .as_ref()
            .and_then(|f| f.get(&service_id))
            .and_then(|r| r.api_key.clone())
        {
            return Some(key);
        }
        if let Some(key) = self.env.get(&service_id).and_then(|r| r.api_key.clone()) {
            return Some(key);
        }
        self.keychain_api_key(&service_id)
    }

    /// The `(client_id, client_secret)` pair for `service_id`, returned
    /// only when both halves are present in the same source (spec §4.2).
    pub fn get_oauth_pair(&self, service_id: &str) -> Option<(String, String)> {
        let service_id = service_id.to_lowercase();

        if let Some(record) = self.file.as_ref().and_then(|f| f.get(&service_id)) {
            if let Some(pair) = oauth_pair(record) {
                return Some(pair);
            }
        }
        if let Some(record) = self.env.get(&service_id) {
            if let Some(pair) = oauth_pair(record) {
                return Some(pair);
            }
        }
        self.keychain_oauth_pair(&service_id)
    }

    /// Which layer most recently satisfied (or would satisfy) a lookup
    /// for `service_id`, checked in priority order. Does not perform a
    /// keychain lookup as a side effect beyond what caching already holds.
    pub fn source_of(&self, service_id: &str) -> Option<CredentialSourceKind> {
        let service_id = service_id.to_lowercase();

        if self
            .file
            .as_ref()
            .and_then(|f| f.get(&service_id))
            .is_some_and(has_any_credential)
        {
            return Some(CredentialSourceKind::File);
        }
        if self.env.get(&service_id).is_some_and(has_any_credential) {
            return Some(CredentialSourceKind::Env);
        }
        if self
            .keychain_cache
            .lock()
            .expect("keychain cache poisoned")
            .contains_key(&service_id)
        {
            return Some(CredentialSourceKind::Keychain);
        }
        None
    }

    #[cfg(feature = "keychain")]
    fn keychain_api_key(&self, service_id: &str) -> Option<String> {
        if !self.keychain_enabled {
            return None;
        }
        if let Some(record) = self.keychain_cache.lock().expect("keychain cache poisoned").get(service_id) {
            if record.api_key.is_some() {
                return record.api_key.clone();
            }
        }

        let entry = keyring::Entry::new(
            &format!("{KEYCHAIN_API_KEY_ACCOUNT_PREFIX}:{service_id}"),
            service_id,
        )
        .ok()?;
        match entry.get_password() {
            Ok(value) => {
                self.keychain_cache
                    .lock()
                    .expect("keychain cache poisoned")
                    .entry(service_id.to_string())
                    .or_default()
                    .api_key = Some(value.clone());
                Some(value)
            }
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(service_id, error = %e, "keychain API key lookup failed, treating as absent");
                None
            }
        }
    }

    #[cfg(not(feature = "keychain"))]
    fn keychain_api_key(&self, _service_id: &str) -> Option<String> {
        None
    }

    #[cfg(feature = "keychain")]
    fn keychain_oauth_pair(&self, service_id: &str) -> Option<(String, String)> {
        if !self.keychain_enabled {
            return None;
        }
        if let Some(record) = self.keychain_cache.lock().expect("keychain cache poisoned").get(service_id) {
            if let Some(pair) = oauth_pair(record) {
                return Some(pair);
            }
        }

        let service = format!("{KEYCHAIN_OAUTH_SERVICE_PREFIX}:{service_id}");
        let client_id = Self::keychain_get(&service, "clientId")?;
        let client_secret = Self::keychain_get(&service, "clientSecret")?;

        self.keychain_cache
            .lock()
            .expect("keychain cache poisoned")
            .entry(service_id.to_string())
            .or_default()
            .oauth_client_id = Some(client_id.clone());
        self.keychain_cache
            .lock()
            .expect("keychain cache poisoned")
            .entry(service_id.to_string())
            .or_default()
            .oauth_client_secret = Some(client_secret.clone());

        Some((client_id, client_secret))
    }

    #[cfg(not(feature = "keychain"))]
    fn keychain_oauth_pair(&self, _service_id: &str) -> Option<(String, String)> {
        None
    }

    #[cfg(feature = "keychain")]
    fn keychain_get(service: &str, account: &str) -> Option<String> {
        let entry = keyring::Entry::new(service, account).ok()?;
        match entry.get_password() {
            Ok(value) => Some(value),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(service, account, error = %e, "keychain lookup failed, treating as absent");
                None
            }
        }
    }

    /// Persist an API key to the OS keychain. Fatal if the keychain
    /// backend is unavailable (spec §4.2 — unlike `get_*`, `set_*`
    /// failures are not recovered locally).
    #[cfg(feature = "keychain")]
    pub fn set_api_key_in_keychain(&self, service_id: &str, value: &str) -> A2AResult<()> {
        let service_id = service_id.to_lowercase();
        let entry = keyring::Entry::new(
            &format!("{KEYCHAIN_API_KEY_ACCOUNT_PREFIX}:{service_id}"),
            &service_id,
        )
        .map_err(|e| A2AError::KeyMgmt { message: e.to_string() })?;
        entry
            .set_password(value)
            .map_err(|e| A2AError::KeyMgmt { message: e.to_string() })?;
        self.keychain_cache
            .lock()
            .expect("keychain cache poisoned")
            .entry(service_id)
            .or_default()
            .api_key = Some(value.to_string());
        Ok(())
    }

    #[cfg(not(feature = "keychain"))]
    pub fn set_api_key_in_keychain(&self, _service_id: &str, _value: &str) -> A2AResult<()> {
        Err(A2AError::KeyMgmt {
            message: "keychain support was not compiled in (enable the `keychain` feature)".into(),
        })
    }

    /// Persist an OAuth2 client credential pair to the OS keychain.
    #[cfg(feature = "keychain")]
    pub fn set_oauth_pair_in_keychain(
        &self,
        service_id: &str,
        client_id: &str,
        client_secret: &str,
    ) -> A2AResult<()> {
        let service_id = service_id.to_lowercase();
        let service = format!("{KEYCHAIN_OAUTH_SERVICE_PREFIX}:{service_id}");

        let id_entry = keyring::Entry::new(&service, "clientId")
            .map_err(|e| A2AError::KeyMgmt { message: e.to_string() })?;
        id_entry
            .set_password(client_id)
            .map_err(|e| A2AError::KeyMgmt { message: e.to_string() })?;

        let secret_entry = keyring::Entry::new(&service, "clientSecret")
            .map_err(|e| A2AError::KeyMgmt { message: e.to_string() })?;
        secret_entry
            .set_password(client_secret)
            .map_err(|e| A2AError::KeyMgmt { message: e.to_string() })?;

        let mut cache = self.keychain_cache.lock().expect("keychain cache poisoned");
        let record = cache.entry(service_id).or_default();
        record.oauth_client_id = Some(client_id.to_string());
        record.oauth_client_secret = Some(client_secret.to_string());
        Ok(())
    }

    #[cfg(not(feature = "keychain"))]
    pub fn set_oauth_pair_in_keychain(
        &self,
        _service_id: &str,
        _client_id: &str,
        _client_secret: &str,
    ) -> A2AResult<()> {
        Err(A2AError::KeyMgmt {
            message: "keychain support was not compiled in (enable the `keychain` feature)".into(),
        })
    }
}

fn oauth_pair(record: &CredentialRecord) -> Option<(String, String)> {
    match (&record.oauth_client_id, &record.oauth_client_secret) {
        (Some(id), Some(secret)) => Some((id.clone(), secret.clone())),
        _ => None,
    }
}

fn has_any_credential(record: &CredentialRecord) -> bool {
    record.api_key.is_some() || oauth_pair(record).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AgentVaultConfig {
        let mut config = AgentVaultConfig::default();
        config.credential_env_prefix = "RESOLVERTEST".to_string();
        config.keychain_enabled = false;
        config
    }

    #[test]
    fn env_source_is_visible_through_resolver() {
        std::env::set_var("RESOLVERTEST_KEY_SVC", "sk-env");
        let resolver = CredentialResolver::new(&config());
        assert_eq!(resolver.get_api_key("svc"), Some("sk-env".to_string()));
        assert_eq!(resolver.source_of("svc"), Some(CredentialSourceKind::Env));
        std::env::remove_var("RESOLVERTEST_KEY_SVC");
    }

    #[test]
    fn missing_service_returns_none_not_error() {
        let resolver = CredentialResolver::new(&config());
        assert_eq!(resolver.get_api_key("nonexistent-service"), None);
        assert_eq!(resolver.source_of("nonexistent-service"), None);
    }

    #[test]
    fn file_source_outranks_env_source() {
        std::env::set_var("RESOLVERTEST_KEY_SVC2", "sk-env");
        let dir = std::env::temp_dir();
        let path = dir.join(format!("agentvault-test-creds-{}.env", std::process::id()));
        std::fs::write(&path, "svc2=sk-file\n").unwrap();

        let resolver = CredentialResolver::new(&config())
            .with_file(&path, &config())
            .unwrap();
        assert_eq!(resolver.get_api_key("svc2"), Some("sk-file".to_string()));
        assert_eq!(resolver.source_of("svc2"), Some(CredentialSourceKind::File));

        std::fs::remove_file(&path).ok();
        std::env::remove_var("RESOLVERTEST_KEY_SVC2");
    }

    #[test]
    fn oauth_pair_requires_both_halves() {
        std::env::set_var("RESOLVERTEST_OAUTH_SVC3_CLIENT_ID", "cid");
        let resolver = CredentialResolver::new(&config());
        assert_eq!(resolver.get_oauth_pair("svc3"), None);
        std::env::set_var("RESOLVERTEST_OAUTH_SVC3_CLIENT_SECRET", "cs");
        let resolver = CredentialResolver::new(&config());
        assert_eq!(
            resolver.get_oauth_pair("svc3"),
            Some(("cid".to_string(), "cs".to_string()))
        );
        std::env::remove_var("RESOLVERTEST_OAUTH_SVC3_CLIENT_ID");
        std::env::remove_var("RESOLVERTEST_OAUTH_SVC3_CLIENT_SECRET");
    }
}
