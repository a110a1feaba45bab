//! Filesystem model store.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::{ModelKey, ModelStore};
use crate::{MuninnError, Result};

/// Stores each artifact as `<dir>/<user_id>_<task>.json`.
///
/// Writes go to a `.json.tmp` sibling first and are renamed into place, so
/// readers see either the old or the new file.
#[derive(Debug, Clone)]
pub struct FileModelStore {
    dir: PathBuf,
}

impl FileModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default directory: `<data dir>/muninn/models`.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join("muninn")
            .join("models")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the artifact for `key`.
    pub fn path(&self, key: &ModelKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.file_stem()))
    }
}

impl Default for FileModelStore {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

impl ModelStore for FileModelStore {
    fn read(&self, key: &ModelKey) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MuninnError::Storage(format!(
                "failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    fn write(&self, key: &ModelKey, blob: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            MuninnError::Storage(format!(
                "failed to create model dir {}: {e}",
                self.dir.display()
            ))
        })?;

        let path = self.path(key);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, blob).map_err(|e| {
            MuninnError::Storage(format!("failed to write {}: {e}", tmp_path.display()))
        })?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            MuninnError::Storage(format!(
                "failed to rename {} → {}: {e}",
                tmp_path.display(),
                path.display()
            ))
        })
    }

    fn delete(&self, key: &ModelKey) -> Result<()> {
        let path = self.path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MuninnError::Storage(format!(
                "failed to delete {}: {e}",
                path.display()
            ))),
        }
    }

    fn last_modified(&self, key: &ModelKey) -> Result<Option<DateTime<Utc>>> {
        let path = self.path(key);
        let metadata = match fs::metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(MuninnError::Storage(format!(
                    "failed to stat {}: {e}",
                    path.display()
                )));
            }
        };
        let modified = metadata.modified().map_err(|e| {
            MuninnError::Storage(format!("no modification time for {}: {e}", path.display()))
        })?;
        Ok(Some(DateTime::<Utc>::from(modified)))
    }
}
