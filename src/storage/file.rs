//! File-backed storage backend.
//!
//! Each collection key maps to one JSON document under the store's root
//! directory. Saves go through a write-to-temp-then-rename pattern so a
//! crash mid-write never leaves a torn file, with an optional fsync before
//! the rename.
//!
//! # File Format
//!
//! A versioned envelope:
//!
//! ```json
//! { "version": 1, "rules": [ ... ] }
//! ```
//!
//! A bare rule array (the layout that predates the version tag) is still
//! accepted on load.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::rule::AlertRule;
use crate::storage::traits::{RuleStore, StorageError};

const LAYOUT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    version: u32,
    rules: Vec<AlertRule>,
}

/// JSON-file-backed [`RuleStore`].
#[derive(Debug)]
pub struct FileRuleStore {
    dir: PathBuf,
    sync_on_write: bool,
}

impl FileRuleStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns [`StorageError::Backend`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| StorageError::Backend(format!("create {}: {e}", dir.display())))?;
        Ok(Self {
            dir,
            sync_on_write: true,
        })
    }

    /// Disable the fsync before rename. Faster, but a power loss can drop
    /// the most recent save.
    #[must_use]
    pub fn without_sync(mut self) -> Self {
        self.sync_on_write = false;
        self
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(StorageError::Backend(format!(
                "invalid collection key: {key:?}"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl RuleStore for FileRuleStore {
    fn load(&self, key: &str) -> Result<Option<Vec<AlertRule>>, StorageError> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::Backend(format!(
                    "read {}: {e}",
                    path.display()
                )))
            }
        };

        if let Ok(envelope) = serde_json::from_slice::<Envelope>(&bytes) {
            return Ok(Some(envelope.rules));
        }

        // Legacy layout: a bare array with no version tag.
        let rules = serde_json::from_slice::<Vec<AlertRule>>(&bytes).map_err(|e| {
            StorageError::Serialization(format!("decode {}: {e}", path.display()))
        })?;
        Ok(Some(rules))
    }

    fn save(&self, key: &str, rules: &[AlertRule]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let envelope = Envelope {
            version: LAYOUT_VERSION,
            rules: rules.to_vec(),
        };
        let bytes = serde_json::to_vec_pretty(&envelope)
            .map_err(|e| StorageError::Serialization(format!("encode {key}: {e}")))?;

        let tmp = path.with_extension("json.tmp");
        let mut file = File::create(&tmp)
            .map_err(|e| StorageError::Backend(format!("create {}: {e}", tmp.display())))?;
        file.write_all(&bytes)
            .map_err(|e| StorageError::Backend(format!("write {}: {e}", tmp.display())))?;
        if self.sync_on_write {
            file.sync_all()
                .map_err(|e| StorageError::Backend(format!("sync {}: {e}", tmp.display())))?;
        }
        drop(file);

        // Atomic rename
        fs::rename(&tmp, &path).map_err(|e| {
            StorageError::Backend(format!("rename {} -> {}: {e}", tmp.display(), path.display()))
        })?;
        Ok(())
    }
}
