//! Persistence of the wallet record (id, name, invitation secret).

use crate::error::WalletError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// What the client remembers about the wallet between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletRecord {
    #[serde(default)]
    pub wallet_id: Option<String>,
    #[serde(default)]
    pub wallet_name: Option<String>,
    #[serde(default)]
    pub wallet_secret: Option<String>,
}

pub trait WalletRepository: Send + Sync {
    fn load(&self) -> Result<WalletRecord, WalletError>;
    fn save(&self, record: &WalletRecord) -> Result<(), WalletError>;
}

/// In-memory repository.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    record: Mutex<WalletRecord>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WalletRepository for MemoryRepository {
    fn load(&self) -> Result<WalletRecord, WalletError> {
        self.record
            .lock()
            .map(|r| r.clone())
            .map_err(|_| WalletError::Storage("repository lock poisoned".into()))
    }

    fn save(&self, record: &WalletRecord) -> Result<(), WalletError> {
        let mut guard = self
            .record
            .lock()
            .map_err(|_| WalletError::Storage("repository lock poisoned".into()))?;
        *guard = record.clone();
        Ok(())
    }
}

/// JSON file repository. A missing file reads as an empty record.
#[derive(Debug, Clone)]
pub struct FileRepository {
    path: PathBuf,
}

impl FileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WalletRepository for FileRepository {
    fn load(&self) -> Result<WalletRecord, WalletError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(WalletRecord::default()),
            Err(e) => {
                return Err(WalletError::Storage(format!(
                    "read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        serde_json::from_str(&data)
            .map_err(|e| WalletError::Storage(format!("parse {}: {}", self.path.display(), e)))
    }

    fn save(&self, record: &WalletRecord) -> Result<(), WalletError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                WalletError::Storage(format!("create {}: {}", parent.display(), e))
            })?;
        }
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| WalletError::Storage(e.to_string()))?;
        std::fs::write(&self.path, json)
            .map_err(|e| WalletError::Storage(format!("write {}: {}", self.path.display(), e)))
    }
}
