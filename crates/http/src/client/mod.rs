//! Assist HTTP client
//!
//! Every call goes through [`AssistClient::send`]: the stored access token is
//! attached as a bearer credential, and a `401` triggers one refresh of the
//! access token followed by a single replay of the original request.

pub mod admin;
pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod receipt;
pub mod refresh;
pub mod request;
pub mod session;

pub use config::ClientConfig;
pub use request::{FormPart, PendingRequest, RequestBody, RequestOptions};
pub use session::{
    LogSessionExpired, MemorySessionStore, Session, SessionExpiredHandler, SessionKey,
    SessionStore,
};

use crate::types::ApiEnvelope;
use bytes::Bytes;
use error::ClientError;
use refresh::{RefreshCoordinator, RefreshOutcome};
use reqwest::{Client, ClientBuilder, Method, Response, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Assist API client
#[derive(Clone)]
pub struct AssistClient {
    client: Client,
    base_url: String,
    login_route: String,
    session: Session,
    expired_handler: Arc<dyn SessionExpiredHandler>,
    refresher: Arc<RefreshCoordinator>,
}

impl AssistClient {
    /// Create a new client with an in-memory session
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> AssistClientBuilder {
        AssistClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Route handed to the session-expired handler
    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    /// Credentials this client authenticates with
    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn build(
        &self,
        pending: &PendingRequest,
        token: Option<&str>,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        let mut builder = self
            .client
            .request(pending.method().clone(), self.url(pending.path()));

        if let Some(query) = pending
            .query_params()
            .filter(|q| q.as_object().is_none_or(|o| !o.is_empty()))
        {
            builder = builder.query(query);
        }

        builder = match pending.request_body() {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Multipart(parts) => builder.multipart(request::build_form(parts)?),
        };

        // Overrides replace what the body set, except the multipart boundary
        let mut overrides = pending.headers().clone();
        if matches!(pending.request_body(), RequestBody::Multipart(_)) {
            overrides.remove(header::CONTENT_TYPE);
        }
        if !overrides.is_empty() {
            builder = builder.headers(overrides);
        }

        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        Ok(builder)
    }

    /// Send one attempt with the given credential, no recovery
    pub(crate) async fn dispatch(
        &self,
        pending: &PendingRequest,
        token: Option<&str>,
    ) -> Result<Response, ClientError> {
        debug!(
            method = %pending.method(),
            path = pending.path(),
            authorized = token.is_some(),
            replay = pending.is_replay(),
            "Sending request"
        );
        let response = self.build(pending, token)?.send().await?;
        debug!(path = pending.path(), status = %response.status(), "Received response");
        Ok(response)
    }

    /// Send a request with the stored credential.
    ///
    /// A `401` on the first attempt refreshes the access token and replays
    /// the request once; the replay's result is final. Other errors are
    /// returned as they are.
    pub async fn send(&self, request: PendingRequest) -> Result<Response, ClientError> {
        let generation = self.refresher.generation();
        let token = self.session.access_token();
        let response = self.dispatch(&request, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED || request.is_replay() {
            return check_status(response).await;
        }

        let rejected = ClientError::from_response(response).await;
        debug!(path = request.path(), "Access token rejected");

        let settled = self
            .refresher
            .refresh(self, token.as_deref(), generation)
            .await;
        if !settled.joined && !matches!(settled.outcome, RefreshOutcome::Refreshed(_)) {
            self.notify_expired();
        }

        match settled.outcome {
            RefreshOutcome::Refreshed(token) => {
                let replay = request.into_replay();
                let response = self.dispatch(&replay, Some(&token)).await?;
                check_status(response).await
            }
            RefreshOutcome::NoRefreshToken => Err(rejected),
            RefreshOutcome::Failed(reason) => Err(ClientError::RefreshFailed(reason)),
        }
    }

    /// Send a request without credentials or refresh handling
    pub async fn send_public(&self, request: PendingRequest) -> Result<Response, ClientError> {
        let response = self.dispatch(&request, None).await?;
        check_status(response).await
    }

    fn notify_expired(&self) {
        warn!(login_route = %self.login_route, "Session expired");
        self.expired_handler.on_session_expired(&self.login_route);
    }

    /// Issue a request by parts
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
        options: Option<RequestOptions>,
    ) -> Result<Response, ClientError> {
        let mut request = PendingRequest::new(method, path);
        if let Some(body) = body {
            request = request.body(body);
        }
        if let Some(options) = options {
            request = request.options(options);
        }
        self.send(request).await
    }

    /// Send and decode a JSON response
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        request: PendingRequest,
    ) -> Result<T, ClientError> {
        decode_json(self.send(request).await?).await
    }

    /// Send and return the raw response body
    pub async fn request_bytes(&self, request: PendingRequest) -> Result<Bytes, ClientError> {
        Ok(self.send(request).await?.bytes().await?)
    }

    /// Send and unwrap the `{ success, data, message }` envelope
    pub async fn request_data<T: DeserializeOwned>(
        &self,
        request: PendingRequest,
    ) -> Result<T, ClientError> {
        let envelope: Option<ApiEnvelope<T>> = self.request_json(request).await?;
        match envelope {
            Some(envelope) => envelope.into_data(),
            None => Ok(serde_json::from_value(JsonValue::Null)?),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request_json(PendingRequest::get(path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json(PendingRequest::post(path).json(body)?)
            .await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_json(PendingRequest::put(path).json(body)?)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request_json(PendingRequest::delete(path)).await
    }
}

async fn check_status(response: Response) -> Result<Response, ClientError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(ClientError::from_response(response).await)
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let body = response.bytes().await?;
    if body.iter().all(u8::is_ascii_whitespace) {
        // 204 and friends
        return Ok(serde_json::from_value(JsonValue::Null)?);
    }
    Ok(serde_json::from_slice(&body)?)
}

impl<T: DeserializeOwned> ApiEnvelope<T> {
    /// `success: false` becomes [`ClientError::Application`] with the server's message
    pub fn into_result(self) -> Result<Option<T>, ClientError> {
        if self.success {
            Ok(self.data)
        } else {
            Err(ClientError::Application(
                self.message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ))
        }
    }

    /// Like [`into_result`](Self::into_result), treating a missing `data` as JSON `null`
    pub fn into_data(self) -> Result<T, ClientError> {
        match self.into_result()? {
            Some(data) => Ok(data),
            None => Ok(serde_json::from_value(JsonValue::Null)?),
        }
    }
}

/// Builder for AssistClient
#[derive(Default)]
pub struct AssistClientBuilder {
    config: ClientConfig,
    timeout: Option<Duration>,
    session_store: Option<Arc<dyn SessionStore>>,
    expired_handler: Option<Arc<dyn SessionExpiredHandler>>,
}

impl AssistClientBuilder {
    /// Start from a full configuration
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the route reported when the session expires
    pub fn login_route(mut self, route: impl Into<String>) -> Self {
        self.config.login_route = route.into();
        self
    }

    /// Set the request timeout; takes precedence over `timeout_secs`
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Where credentials are read from and written to
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    /// Called once per unrecoverable authentication failure
    pub fn on_session_expired(mut self, handler: impl SessionExpiredHandler + 'static) -> Self {
        self.expired_handler = Some(Arc::new(handler));
        self
    }

    /// Build the client
    pub fn build(self) -> Result<AssistClient, ClientError> {
        let base_url = self.config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration("base_url is required".into()));
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::Configuration(format!(
                "base_url must be an http(s) URL: {base_url}"
            )));
        }

        let mut client_builder = ClientBuilder::new();

        #[cfg(not(target_arch = "wasm32"))]
        {
            client_builder = client_builder.user_agent(self.config.user_agent.clone());
            let timeout = self.timeout.or_else(|| {
                self.config
                    .timeout_secs
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs)
            });
            if let Some(timeout) = timeout.filter(|t| !t.is_zero()) {
                client_builder = client_builder.timeout(timeout);
            }
        }

        let client = client_builder.build()?;

        Ok(AssistClient {
            client,
            base_url,
            login_route: self.config.login_route,
            session: Session::new(
                self.session_store
                    .unwrap_or_else(|| Arc::new(MemorySessionStore::new())),
            ),
            expired_handler: self
                .expired_handler
                .unwrap_or_else(|| Arc::new(LogSessionExpired)),
            refresher: Arc::new(RefreshCoordinator::default()),
        })
    }
}
