//! Shared setup for client integration tests

#![allow(dead_code)]

use assist_http::client::{MemorySessionStore, SessionKey, SessionStore};
use assist_http::AssistClient;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::MockServer;

pub struct Harness {
    pub client: AssistClient,
    pub store: Arc<MemorySessionStore>,
    pub expired: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    /// Routes passed to the session-expired handler so far
    pub fn expired_routes(&self) -> Vec<String> {
        self.expired.lock().unwrap().clone()
    }

    pub fn stored(&self, key: SessionKey) -> Option<String> {
        self.store.get(key)
    }

    pub fn session_is_empty(&self) -> bool {
        SessionKey::ALL.iter().all(|key| self.store.get(*key).is_none())
    }
}

/// Client pointed at `{server}/api` with the given credentials pre-stored
pub fn harness(server: &MockServer, access: Option<&str>, refresh: Option<&str>) -> Harness {
    harness_at(&format!("{}/api", server.uri()), access, refresh, None)
}

/// Like [`harness`], for an arbitrary base URL and optional request timeout
pub fn harness_at(
    base_url: &str,
    access: Option<&str>,
    refresh: Option<&str>,
    timeout: Option<Duration>,
) -> Harness {
    let store = Arc::new(MemorySessionStore::new());
    if let Some(access) = access {
        store.set(SessionKey::AccessToken, access).unwrap();
    }
    if let Some(refresh) = refresh {
        store.set(SessionKey::RefreshToken, refresh).unwrap();
    }
    store
        .set(SessionKey::User, r#"{"user_login_id":"alice"}"#)
        .unwrap();

    let expired = Arc::new(Mutex::new(Vec::new()));
    let sink = expired.clone();

    let mut builder = AssistClient::builder()
        .base_url(base_url)
        .session_store(store.clone())
        .on_session_expired(move |route: &str| sink.lock().unwrap().push(route.to_string()));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    let client = builder.build().unwrap();

    Harness {
        client,
        store,
        expired,
    }
}
