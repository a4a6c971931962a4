use super::{SessionKey, SessionStore};
use crate::client::error::ClientError;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-process session store, for tests and hosts without persistence
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: RwLock<HashMap<SessionKey, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> ClientError {
        ClientError::Storage("session lock poisoned".into())
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        self.values.read().ok()?.get(&key).cloned()
    }

    fn set(&self, key: SessionKey, value: &str) -> Result<(), ClientError> {
        self.values
            .write()
            .map_err(|_| Self::poisoned())?
            .insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: SessionKey) -> Result<(), ClientError> {
        self.values
            .write()
            .map_err(|_| Self::poisoned())?
            .remove(&key);
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        self.values.write().map_err(|_| Self::poisoned())?.clear();
        Ok(())
    }
}
