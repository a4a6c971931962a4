//! Admin back-office client methods

use super::{AssistClient, ClientError, PendingRequest};
use crate::types::{ListQuery, UseYn, UseYnUpdateRequest};
use bytes::Bytes;
use serde_json::Value as JsonValue;

impl AssistClient {
    /// One page of members
    pub async fn list_users(&self, query: &ListQuery) -> Result<JsonValue, ClientError> {
        let request = PendingRequest::get("/admin/users/").query(query)?;
        self.request_data(request).await
    }

    /// Enable or disable member accounts
    pub async fn update_user_use_yn(
        &self,
        user_ids: Vec<String>,
        use_yn: UseYn,
    ) -> Result<JsonValue, ClientError> {
        let request = PendingRequest::post("/admin/users/update_use_yn/")
            .json(&UseYnUpdateRequest { user_ids, use_yn })?;
        self.request_data(request).await
    }

    /// One page of submitted receipts
    pub async fn list_receipts(&self, query: &ListQuery) -> Result<JsonValue, ClientError> {
        let request = PendingRequest::get("/admin/receipts/").query(query)?;
        self.request_data(request).await
    }

    /// Export of the receipts matching `query`, as the file the server produced
    pub async fn download_receipts(&self, query: &ListQuery) -> Result<Bytes, ClientError> {
        let request =
            PendingRequest::get("/admin/receipts/download").query(query)?;
        self.request_bytes(request).await
    }
}
