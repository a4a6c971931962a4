//! Session credential storage
//!
//! The client never reaches for global state: credentials live behind a
//! [`SessionStore`] handed to the builder, and the host decides what "back to
//! login" means through a [`SessionExpiredHandler`].

#[cfg(not(target_arch = "wasm32"))]
mod file;
mod memory;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileSessionStore;
pub use memory::MemorySessionStore;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use web::LocalStorageSessionStore;

use crate::client::error::ClientError;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::warn;

/// Fixed names under which session state is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    AccessToken,
    RefreshToken,
    User,
}

impl SessionKey {
    pub const ALL: [Self; 3] = [Self::AccessToken, Self::RefreshToken, Self::User];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
            Self::User => "user",
        }
    }
}

/// Key-value store holding the session credentials
pub trait SessionStore: Send + Sync {
    /// Read a value; missing and unreadable entries are both `None`
    fn get(&self, key: SessionKey) -> Option<String>;

    /// Write a value
    fn set(&self, key: SessionKey, value: &str) -> Result<(), ClientError>;

    /// Delete a single value
    fn remove(&self, key: SessionKey) -> Result<(), ClientError>;

    /// Delete every session value
    fn clear(&self) -> Result<(), ClientError> {
        for key in SessionKey::ALL {
            self.remove(key)?;
        }
        Ok(())
    }
}

/// Called when the session is lost for good and the user must log in again
pub trait SessionExpiredHandler: Send + Sync {
    fn on_session_expired(&self, login_route: &str);
}

impl<F> SessionExpiredHandler for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_session_expired(&self, login_route: &str) {
        self(login_route);
    }
}

/// Default handler: records the expiry and leaves navigation to the host
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSessionExpired;

impl SessionExpiredHandler for LogSessionExpired {
    fn on_session_expired(&self, login_route: &str) {
        warn!(login_route, "Session expired, login required");
    }
}

/// Typed view over a [`SessionStore`]
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn access_token(&self) -> Option<String> {
        non_empty(self.store.get(SessionKey::AccessToken))
    }

    pub fn refresh_token(&self) -> Option<String> {
        non_empty(self.store.get(SessionKey::RefreshToken))
    }

    /// Stored identity of the logged-in user
    pub fn user<T: DeserializeOwned>(&self) -> Option<T> {
        let raw = self.store.get(SessionKey::User)?;
        serde_json::from_str(&raw).ok()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Persist the result of a login, replacing any previous session
    pub fn store_login(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        user: Option<&JsonValue>,
    ) -> Result<(), ClientError> {
        self.store.clear()?;
        self.store.set(SessionKey::AccessToken, access_token)?;
        if let Some(refresh_token) = refresh_token {
            self.store.set(SessionKey::RefreshToken, refresh_token)?;
        }
        if let Some(user) = user {
            self.store.set(SessionKey::User, &serde_json::to_string(user)?)?;
        }
        Ok(())
    }

    /// Replace the access token; the refresh token is left as is
    pub fn set_access_token(&self, access_token: &str) -> Result<(), ClientError> {
        self.store.set(SessionKey::AccessToken, access_token)
    }

    /// Replace the stored identity (e.g. after a profile update)
    pub fn set_user(&self, user: &JsonValue) -> Result<(), ClientError> {
        self.store.set(SessionKey::User, &serde_json::to_string(user)?)
    }

    pub fn clear(&self) -> Result<(), ClientError> {
        self.store.clear()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
