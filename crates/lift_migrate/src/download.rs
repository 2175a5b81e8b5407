use chrono::{DateTime, Utc};
use lift_core::LiftError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Opaque reference to an archive held by a [`DownloadStore`].
///
/// Handles are session-scoped: they stay valid until released, and the
/// holder is expected to release them once the download is superseded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DownloadHandle {
    id: Uuid,
    file_name: String,
}

impl DownloadHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Suggested file name for the saved archive.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Transient URL form of the handle, valid for the life of the store.
    pub fn url(&self) -> String {
        format!("blob:ledgerlift/{}", self.id)
    }
}

struct StoredArtifact {
    bytes: Arc<Vec<u8>>,
    created_at: DateTime<Utc>,
}

/// In-memory registry of downloadable archives.
#[derive(Default)]
pub struct DownloadStore {
    artifacts: Mutex<HashMap<Uuid, StoredArtifact>>,
}

impl DownloadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `bytes` and return a handle to them.
    pub fn register(&self, file_name: impl Into<String>, bytes: Vec<u8>) -> DownloadHandle {
        let handle = DownloadHandle {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
        };
        debug!(id = %handle.id, size = bytes.len(), "registered download");
        self.artifacts.lock().insert(
            handle.id,
            StoredArtifact {
                bytes: Arc::new(bytes),
                created_at: Utc::now(),
            },
        );
        handle
    }

    pub fn bytes(&self, handle: &DownloadHandle) -> Result<Arc<Vec<u8>>, LiftError> {
        self.artifacts
            .lock()
            .get(&handle.id)
            .map(|artifact| Arc::clone(&artifact.bytes))
            .ok_or_else(|| LiftError::UnknownHandle(handle.id.to_string()))
    }

    pub fn created_at(&self, handle: &DownloadHandle) -> Option<DateTime<Utc>> {
        self.artifacts.lock().get(&handle.id).map(|a| a.created_at)
    }

    /// Write the archive into `dir` under the handle's file name.
    pub fn save_to_dir(&self, handle: &DownloadHandle, dir: &Path) -> Result<PathBuf, LiftError> {
        let bytes = self.bytes(handle)?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&handle.file_name);
        std::fs::write(&path, bytes.as_slice())?;
        info!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    /// Drop the archive behind `handle`. Returns `false` if it was already
    /// released.
    pub fn release(&self, handle: &DownloadHandle) -> bool {
        let removed = self.artifacts.lock().remove(&handle.id).is_some();
        if removed {
            debug!(id = %handle.id, "released download");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.artifacts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
