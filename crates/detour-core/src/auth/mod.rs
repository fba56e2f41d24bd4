//! Auth gate: per-request credential validation against a trust store.
//!
//! The trust store is a JSON file of API-key entries. Keys are stored as
//! BLAKE3 hex digests, never in plain text; a presented credential is
//! hashed and looked up. Entries carry a role and an active flag, so a
//! key can be deactivated without removing its record.
//!
//! The store is loaded once at startup. An optional refresh interval
//! re-reads the file lazily; a failed refresh keeps the previous store.

pub mod error;


pub use error::AuthError;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::hashing::hash_credential;

/// Access level attached to a trust store entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// On-disk shape of one trust store record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustStoreEntry {
    /// BLAKE3 hex digest of the API key.
    pub key_hash: String,
    pub name: String,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_role() -> Role {
    Role::User
}

fn default_active() -> bool {
    true
}

/// The identity attached to an authorized request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

struct StoredKey {
    name: String,
    role: Role,
    active: bool,
}

/// Immutable set of trusted credentials.
pub struct TrustStore {
    keys: HashMap<String, StoredKey>,
}

impl std::fmt::Debug for TrustStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustStore")
            .field("entries", &self.keys.len())
            .finish()
    }
}

impl TrustStore {
    /// Loads the trust store file. An empty store is fatal at startup:
    /// a service nobody can call is a misconfiguration, not a state.
    pub fn load(path: &Path) -> Result<Self, AuthError> {
        let raw = std::fs::read_to_string(path).map_err(|source| AuthError::StoreRead {
            path: path.to_path_buf(),
            source,
        })?;

        let entries: Vec<TrustStoreEntry> =
            serde_json::from_str(&raw).map_err(|source| AuthError::StoreParse {
                path: path.to_path_buf(),
                source,
            })?;

        let store = Self::from_entries(entries)?;

        info!(
            path = %path.display(),
            entries = store.len(),
            "Trust store loaded"
        );

        Ok(store)
    }

    /// Builds a store from in-memory entries (validated).
    pub fn from_entries(entries: Vec<TrustStoreEntry>) -> Result<Self, AuthError> {
        if entries.is_empty() {
            return Err(AuthError::StoreEmpty);
        }

        let mut keys = HashMap::with_capacity(entries.len());
        for entry in entries {
            let hash = entry.key_hash.to_ascii_lowercase();
            if hash.len() != 64 || !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(AuthError::InvalidKeyHash { name: entry.name });
            }
            keys.insert(
                hash,
                StoredKey {
                    name: entry.name,
                    role: entry.role,
                    active: entry.active,
                },
            );
        }

        Ok(Self { keys })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Validates a presented credential. Inactive entries are rejected
    /// the same way unknown ones are, apart from the log line.
    pub fn authorize(&self, credential: &str) -> Result<Principal, AuthError> {
        let hash = hash_credential(credential);

        let Some(stored) = self.keys.get(&hash) else {
            debug!("Rejected unknown credential");
            return Err(AuthError::InvalidCredential);
        };

        if !stored.active {
            debug!(name = %stored.name, "Rejected deactivated credential");
            return Err(AuthError::InactiveCredential);
        }

        Ok(Principal {
            name: stored.name.clone(),
            role: stored.role,
        })
    }
}

/// Refresh policy for [`TrustStoreHandle`].
#[derive(Debug, Clone)]
pub struct TrustStoreConfig {
    pub path: PathBuf,
    /// `None` keeps the store static for the process lifetime.
    pub refresh_interval: Option<Duration>,
}

struct HandleState {
    store: TrustStore,
    loaded_at: Instant,
}

/// Shared trust store with optional lazy refresh.
///
/// When a refresh interval is configured, the file is re-read on the
/// first authorization after the interval elapses. A refresh failure
/// logs a warning and keeps serving the previous store.
pub struct TrustStoreHandle {
    state: RwLock<HandleState>,
    config: TrustStoreConfig,
}

impl std::fmt::Debug for TrustStoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustStoreHandle")
            .field("entries", &self.state.read().store.len())
            .field("refresh_interval", &self.config.refresh_interval)
            .finish()
    }
}

impl TrustStoreHandle {
    /// Loads the store and wraps it with the given refresh policy.
    pub fn load(config: TrustStoreConfig) -> Result<Self, AuthError> {
        let store = TrustStore::load(&config.path)?;
        Ok(Self {
            state: RwLock::new(HandleState {
                store,
                loaded_at: Instant::now(),
            }),
            config,
        })
    }

    /// Wraps an in-memory store with no refresh (tests and embedding).
    pub fn from_store(store: TrustStore) -> Self {
        Self {
            state: RwLock::new(HandleState {
                store,
                loaded_at: Instant::now(),
            }),
            config: TrustStoreConfig {
                path: PathBuf::new(),
                refresh_interval: None,
            },
        }
    }

    pub fn len(&self) -> usize {
        self.state.read().store.len()
    }

    pub fn authorize(&self, credential: &str) -> Result<Principal, AuthError> {
        self.maybe_refresh();
        self.state.read().store.authorize(credential)
    }

    fn maybe_refresh(&self) {
        let Some(interval) = self.config.refresh_interval else {
            return;
        };

        if self.state.read().loaded_at.elapsed() < interval {
            return;
        }

        let mut state = self.state.write();
        // Another request may have refreshed while we waited for the lock.
        if state.loaded_at.elapsed() < interval {
            return;
        }

        match TrustStore::load(&self.config.path) {
            Ok(store) => {
                debug!(entries = store.len(), "Trust store refreshed");
                state.store = store;
            }
            Err(e) => {
                warn!("Trust store refresh failed, keeping previous store: {}", e);
            }
        }
        state.loaded_at = Instant::now();
    }
}
