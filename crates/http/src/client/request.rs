//! Owned request descriptors
//!
//! A [`PendingRequest`] keeps everything needed to rebuild the transport
//! request, so the client can send it a second time after a credential
//! refresh. Bodies are held as data, never as one-shot streams.

use crate::client::error::ClientError;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Request payload
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(JsonValue),
    Multipart(Vec<FormPart>),
}

/// One field of a multipart form
#[derive(Debug, Clone)]
pub struct FormPart {
    name: String,
    value: FormValue,
}

#[derive(Debug, Clone)]
enum FormValue {
    Text(String),
    File {
        bytes: Bytes,
        file_name: String,
        mime: Option<String>,
    },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }

    pub fn file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: impl Into<Bytes>,
        mime: Option<&str>,
    ) -> Self {
        Self {
            name: name.into(),
            value: FormValue::File {
                bytes: bytes.into(),
                file_name: file_name.into(),
                mime: mime.map(str::to_string),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

pub(crate) fn build_form(parts: &[FormPart]) -> Result<Form, ClientError> {
    let mut form = Form::new();
    for part in parts {
        form = match &part.value {
            FormValue::Text(text) => form.text(part.name.clone(), text.clone()),
            FormValue::File {
                bytes,
                file_name,
                mime,
            } => {
                let mut file = Part::bytes(bytes.to_vec()).file_name(file_name.clone());
                if let Some(mime) = mime {
                    file = file.mime_str(mime)?;
                }
                form.part(part.name.clone(), file)
            }
        };
    }
    Ok(form)
}

/// Per-request header overrides.
///
/// `Authorization` is owned by the client and is ignored here. For multipart
/// bodies `Content-Type` is ignored too, since the transport must pick the
/// boundary.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    headers: HeaderMap,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn content_type(self, value: &str) -> Result<Self, ClientError> {
        let value = HeaderValue::from_str(value)
            .map_err(|e| ClientError::Configuration(format!("invalid content type: {e}")))?;
        Ok(self.header(CONTENT_TYPE, value))
    }
}

/// Descriptor of an outbound API call
#[derive(Debug, Clone)]
pub struct PendingRequest {
    method: Method,
    path: String,
    query: Option<JsonValue>,
    headers: HeaderMap,
    body: RequestBody,
    replayed: bool,
}

impl PendingRequest {
    /// `path` is relative to the client's base URL
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
            replayed: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Set a JSON body
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, ClientError> {
        Ok(self.body(RequestBody::Json(serde_json::to_value(body)?)))
    }

    pub fn multipart(self, parts: Vec<FormPart>) -> Self {
        self.body(RequestBody::Multipart(parts))
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Set the query string from any flat serializable value
    pub fn query<T: Serialize + ?Sized>(mut self, query: &T) -> Result<Self, ClientError> {
        self.query = Some(serde_json::to_value(query)?);
        Ok(self)
    }

    pub fn options(mut self, options: RequestOptions) -> Self {
        for (name, value) in &options.headers {
            if name != AUTHORIZATION {
                self.headers.insert(name.clone(), value.clone());
            }
        }
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> Option<&JsonValue> {
        self.query.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn request_body(&self) -> &RequestBody {
        &self.body
    }

    /// Whether this descriptor is the one allowed resend after a refresh
    pub fn is_replay(&self) -> bool {
        self.replayed
    }

    pub(crate) fn into_replay(mut self) -> Self {
        self.replayed = true;
        self
    }
}
