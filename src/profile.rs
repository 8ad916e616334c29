//! Host profiles, credential keys, and their persistence
//!
//! Profiles live as a JSON array under `itmux.hosts` in a caller-provided
//! blob store. Credential records live under `itmux.sshKeys` in a separate
//! secure store; private-key bytes never enter the plain profile store and
//! never appear in logs.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Profile-store key for the host list
pub const HOSTS_KEY: &str = "itmux.hosts";
/// Secure-store key for credential records
pub const KEYS_KEY: &str = "itmux.sshKeys";

/// Milliseconds since the Unix epoch
pub(crate) fn unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Failures from a storage backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(String),

    #[error("corrupt stored record: {0}")]
    Corrupt(String),
}

/// Typed key-value blob store (external collaborator)
pub trait BlobStore: Send + Sync {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store for tests and ephemeral use
#[derive(Default)]
pub struct MemoryBlobStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// How a host prefers to authenticate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthPreference {
    /// Prompt for a password
    Password,
    /// Use the stored credential key with this id
    Key(Uuid),
}

/// A saved remote host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostProfile {
    pub id: Uuid,
    /// Display name
    pub name: String,
    pub hostname: String,
    pub port: u16,
    pub username: String,
    /// Preferred tmux session name
    pub session_name: String,
    pub auth: AuthPreference,
    /// UI accent tag
    pub color_tag: Option<String>,
    /// Millisecond timestamp of the last successful connection
    pub last_connected_at: Option<u64>,
}

impl HostProfile {
    pub fn new(
        name: impl Into<String>,
        hostname: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            hostname: hostname.into(),
            port: 22,
            username: username.into(),
            session_name: "main".to_string(),
            auth: AuthPreference::Password,
            color_tag: None,
            last_connected_at: None,
        }
    }
}

/// A stored private key
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialKey {
    pub id: Uuid,
    /// Human name for the key
    pub name: String,
    /// Key fingerprint for display
    pub fingerprint: String,
    /// Millisecond creation timestamp
    pub created_at: u64,
    /// Opaque private-key blob, base64 in the secure store
    #[serde(with = "base64_bytes")]
    pub private_key: Vec<u8>,
}

impl CredentialKey {
    pub fn new(
        name: impl Into<String>,
        fingerprint: impl Into<String>,
        private_key: Vec<u8>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            fingerprint: fingerprint.into(),
            created_at: unix_millis(),
            private_key,
        }
    }
}

// The blob is never printed
impl fmt::Debug for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialKey")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("fingerprint", &self.fingerprint)
            .field("created_at", &self.created_at)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64.decode(&encoded).map_err(serde::de::Error::custom)
    }
}

/// Host-profile persistence over a blob store
pub struct HostProfileStore {
    store: std::sync::Arc<dyn BlobStore>,
}

impl HostProfileStore {
    pub fn new(store: std::sync::Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Load the saved profiles; an absent key yields an empty list
    pub fn load(&self) -> Result<Vec<HostProfile>, StoreError> {
        match self.store.get(HOSTS_KEY)? {
            Some(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt(e.to_string()))
            }
            None => Ok(Vec::new()),
        }
    }

    pub fn save(&self, profiles: &[HostProfile]) -> Result<(), StoreError> {
        let bytes =
            serde_json::to_vec(profiles).map_err(|e| StoreError::Backend(e.to_string()))?;
        self.store.put(HOSTS_KEY, &bytes)
    }
}

/// Credential persistence over the secure blob store
pub struct CredentialStore {
    store: std::sync::Arc<dyn BlobStore>,
}

impl CredentialStore {
    pub fn new(store: std::sync::Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Result<Vec<CredentialKey>, StoreError> {
        match self.store.get(KEYS_KEY)? {
            Some(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt(e.to_string()))
            }
            None => Ok(Vec::new()),
        }
    }

    pub fn save(&self, keys: &[CredentialKey]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(keys).map_err(|e| StoreError::Backend(e.to_string()))?;
        self.store.put(KEYS_KEY, &bytes)
    }

    /// Look up one credential by id
    pub fn get(&self, id: Uuid) -> Result<Option<CredentialKey>, StoreError> {
        Ok(self.load()?.into_iter().find(|k| k.id == id))
    }

    /// Insert or replace a credential
    pub fn put(&self, key: CredentialKey) -> Result<(), StoreError> {
        let mut keys = self.load()?;
        keys.retain(|k| k.id != key.id);
        keys.push(key);
        self.save(&keys)
    }

    /// Remove a credential by id
    pub fn remove(&self, id: Uuid) -> Result<(), StoreError> {
        let mut keys = self.load()?;
        keys.retain(|k| k.id != id);
        if keys.is_empty() {
            self.store.delete(KEYS_KEY)
        } else {
            self.save(&keys)
        }
    }
}
