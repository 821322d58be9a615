//! Key/value backends for the session.
//!
//! [`FileStore`] keeps every key in one JSON object on disk:
//! - atomic writes (temp file in the same directory, then rename)
//! - 0600 permissions on Unix
//! - a warning when an existing file is readable by others
//!
//! [`MemoryStore`] keeps values in process memory.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{ObError, Result};

/// Storage port for session values.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            let mode = fs::metadata(&self.path)?.mode() & 0o777;
            if mode & 0o077 != 0 {
                warn!(
                    path = %self.path.display(),
                    mode = format!("{mode:o}"),
                    "Session file has insecure permissions"
                );
            }
        }

        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|err| {
            ObError::Config(format!(
                "invalid session file {}: {err}",
                self.path.display()
            ))
        })
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let json = serde_json::to_string_pretty(values)?;
        let mut temp = tempfile::NamedTempFile::new_in(parent)?;
        temp.write_all(json.as_bytes())?;
        temp.flush()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o600))?;
        }

        temp.persist(&self.path).map_err(|err| err.error)?;
        debug!(path = %self.path.display(), keys = values.len(), "session saved");
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.read_all()?;
        if values.remove(key).is_none() {
            return Ok(());
        }
        if values.is_empty() {
            fs::remove_file(&self.path)?;
            return Ok(());
        }
        self.write_all(&values)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}
