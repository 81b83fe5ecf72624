/// Credential persistence
///
/// The core treats credential retrieval as a capability that may fail: a
/// lazy `get` on the first remote call that finds nothing sends the session
/// back to `NeedsCredential`. The file store keeps a single key file under
/// the per-user data directory; the in-memory store backs tests.
use log::warn;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::GenerationError;

/// Per-user data directory for the studio.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("veogen")
}

/// Stores and retrieves the API credential. The core enforces no format
/// beyond non-emptiness.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, credential: &str) -> Result<(), GenerationError>;
    fn clear(&self);
}

/// Single key file on disk.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new() -> Self {
        Self {
            path: app_data_dir().join("credential"),
        }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Default for FileCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<String> {
        let contents = fs::read_to_string(&self.path).ok()?;
        let key = contents.trim();
        if key.is_empty() {
            None
        } else {
            Some(key.to_string())
        }
    }

    fn set(&self, credential: &str) -> Result<(), GenerationError> {
        let key = credential.trim();
        if key.is_empty() {
            return Err(GenerationError::Credential(
                "credential must not be empty".to_string(),
            ));
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| GenerationError::Credential(e.to_string()))?;
        }
        fs::write(&self.path, key).map_err(|e| GenerationError::Credential(e.to_string()))
    }

    fn clear(&self) {
        if self.path.exists() {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!("failed to remove credential file: {e}");
            }
        }
    }
}

/// In-memory store. Clones share the same slot, which lets tests inspect
/// the state after handing a clone to the orchestrator.
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    inner: Arc<Mutex<Option<String>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(key.to_string()))),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<String> {
        self.inner.lock().ok()?.clone()
    }

    fn set(&self, credential: &str) -> Result<(), GenerationError> {
        let key = credential.trim();
        if key.is_empty() {
            return Err(GenerationError::Credential(
                "credential must not be empty".to_string(),
            ));
        }
        if let Ok(mut slot) = self.inner.lock() {
            *slot = Some(key.to_string());
        }
        Ok(())
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.inner.lock() {
            *slot = None;
        }
    }
}
