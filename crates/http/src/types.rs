//! Wire types shared by the client and its callers

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Standard response envelope used by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub user_login_id: String,
    pub passwd: String,
}

/// Tokens and identity returned by a successful login.
///
/// The backend has used both `access_token`/`refresh_token` and the shorter
/// `token`/`refresh` names, so both are accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "token", alias = "access")]
    pub access_token: String,
    #[serde(default, alias = "refresh")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<JsonValue>,
}

/// Refresh request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Payload of a refresh envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshData {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Password change request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordChangeRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// New chat request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Question sent to a chat
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatQueryRequest {
    pub question: String,
}

/// Report filed against a chat answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReportRequest {
    pub reason: String,
}

/// Account enabled flag as the backend spells it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UseYn {
    #[serde(rename = "Y")]
    Enabled,
    #[serde(rename = "N")]
    Disabled,
}

/// Bulk enable/disable of member accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UseYnUpdateRequest {
    pub user_ids: Vec<String>,
    pub use_yn: UseYn,
}

/// Pagination, search and date filters for admin listings.
///
/// Paging and searching happen on the server; this only carries the
/// parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "is_blank")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub end_date: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}
