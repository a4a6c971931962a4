//! Session persisted as a JSON map on disk.
//!
//! Every change is written to a sibling temp file with owner-only
//! permissions (0600 on unix) and renamed over the session file, so a
//! crash mid-write never leaves a torn session behind. Token values are
//! never logged.

use super::{SessionKey, SessionStore};
use crate::client::error::ClientError;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

/// File-backed session store
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl FileSessionStore {
    /// Open the store at `path`, loading any existing session.
    /// A missing file is an empty session.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        let values = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| {
                ClientError::Storage(format!("failed to read {}: {e}", path.display()))
            })?;
            if contents.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&contents).map_err(|e| {
                    ClientError::Storage(format!("failed to parse {}: {e}", path.display()))
                })?
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), entries = values.len(), "Opened session file");
        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy, persist it, and only then make it current
    fn update(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, String>),
    ) -> Result<(), ClientError> {
        let mut values = self
            .values
            .write()
            .map_err(|_| ClientError::Storage("session lock poisoned".into()))?;
        let mut next = values.clone();
        change(&mut next);
        self.persist(&next)?;
        *values = next;
        Ok(())
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ClientError::Storage(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let contents = serde_json::to_string_pretty(values)?;
        let temp_path = self.temp_path();
        write_private(&temp_path, contents.as_bytes())
            .and_then(|()| fs::rename(&temp_path, &self.path))
            .map_err(|e| {
                let _ = fs::remove_file(&temp_path);
                ClientError::Storage(format!("failed to write {}: {e}", self.path.display()))
            })
    }

    /// Sibling the new contents are written to before being renamed over
    /// the session file
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode() only applies on creation
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        self.values.read().ok()?.get(key.as_str()).cloned()
    }

    fn set(&self, key: SessionKey, value: &str) -> Result<(), ClientError> {
        self.update(|values| {
            values.insert(key.as_str().to_string(), value.to_string());
        })
    }

    fn remove(&self, key: SessionKey) -> Result<(), ClientError> {
        self.update(|values| {
            values.remove(key.as_str());
        })
    }

    fn clear(&self) -> Result<(), ClientError> {
        self.update(BTreeMap::clear)
    }
}
