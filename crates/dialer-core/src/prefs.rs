//! Last dialed number preference

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{DialerError, DialerResult};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredPreferences {
    last_dialed_number: Option<String>,
}

/// Remembers the most recently dialed number, optionally on disk as JSON
pub struct LastDialed {
    number: RwLock<Option<String>>,
    path: Option<PathBuf>,
}

impl LastDialed {
    /// Memory only; forgotten when the process exits
    pub fn in_memory() -> Self {
        Self {
            number: RwLock::new(None),
            path: None,
        }
    }

    /// Backed by the JSON file at `path`. A missing file means nothing was dialed yet.
    pub async fn open(path: impl Into<PathBuf>) -> DialerResult<Self> {
        let path = path.into();
        let stored = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => serde_json::from_str::<StoredPreferences>(&contents)
                .map_err(|e| DialerError::preferences(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoredPreferences::default(),
            Err(e) => return Err(DialerError::preferences(format!("{}: {e}", path.display()))),
        };
        debug!(path = %path.display(), has_number = stored.last_dialed_number.is_some(), "last dialed loaded");
        Ok(Self {
            number: RwLock::new(stored.last_dialed_number),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn get(&self) -> Option<String> {
        self.number.read().await.clone()
    }

    /// Remember `number` and write it through to disk when file-backed
    pub async fn set(&self, number: &str) -> DialerResult<()> {
        let mut slot = self.number.write().await;
        *slot = Some(number.to_string());

        if let Some(path) = &self.path {
            let stored = StoredPreferences {
                last_dialed_number: slot.clone(),
            };
            let json = serde_json::to_string_pretty(&stored)
                .map_err(|e| DialerError::preferences(e.to_string()))?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| DialerError::preferences(format!("{}: {e}", parent.display())))?;
            }
            tokio::fs::write(path, json)
                .await
                .map_err(|e| DialerError::preferences(format!("{}: {e}", path.display())))?;
        }
        Ok(())
    }
}
