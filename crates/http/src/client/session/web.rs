//! Browser `localStorage` session store

use super::{SessionKey, SessionStore};
use crate::client::error::ClientError;
use gloo::storage::{LocalStorage, Storage};

/// Session kept in `window.localStorage` under the fixed key names, as raw
/// strings so other scripts on the page read the same values.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageSessionStore;

fn storage_error(e: impl std::fmt::Debug) -> ClientError {
    ClientError::Storage(format!("localStorage: {e:?}"))
}

impl SessionStore for LocalStorageSessionStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        LocalStorage::raw().get_item(key.as_str()).ok().flatten()
    }

    fn set(&self, key: SessionKey, value: &str) -> Result<(), ClientError> {
        LocalStorage::raw()
            .set_item(key.as_str(), value)
            .map_err(storage_error)
    }

    fn remove(&self, key: SessionKey) -> Result<(), ClientError> {
        LocalStorage::raw()
            .remove_item(key.as_str())
            .map_err(storage_error)
    }
}
