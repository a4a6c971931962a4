//! Chat API client methods

use super::{AssistClient, ClientError, PendingRequest};
use crate::types::{ChatQueryRequest, ChatReportRequest, NewChatRequest};
use serde_json::Value as JsonValue;
use std::fmt::Display;

impl AssistClient {
    /// List the caller's chats
    pub async fn list_chats(&self) -> Result<JsonValue, ClientError> {
        self.request_data(PendingRequest::get("/chat/list/")).await
    }

    /// Open a new chat
    pub async fn new_chat(&self, title: Option<&str>) -> Result<JsonValue, ClientError> {
        let request = PendingRequest::post("/chat/new/").json(&NewChatRequest {
            title: title.map(str::to_string),
        })?;
        self.request_data(request).await
    }

    /// Ask a question in a chat and get the bot's answer
    pub async fn query_chat(
        &self,
        chat_id: impl Display,
        question: &str,
    ) -> Result<JsonValue, ClientError> {
        let request = PendingRequest::post(format!("/chat/{chat_id}/query/")).json(
            &ChatQueryRequest {
                question: question.to_string(),
            },
        )?;
        self.request_data(request).await
    }

    /// Delete a chat
    pub async fn delete_chat(&self, chat_id: impl Display) -> Result<(), ClientError> {
        let _: Option<JsonValue> = self
            .request_data(PendingRequest::delete(format!("/chat/{chat_id}/delete/")))
            .await?;
        Ok(())
    }

    /// Report a chat answer for admin review
    pub async fn report_chat(
        &self,
        chat_id: impl Display,
        reason: &str,
    ) -> Result<JsonValue, ClientError> {
        let request = PendingRequest::post(format!("/chat/{chat_id}/report/")).json(
            &ChatReportRequest {
                reason: reason.to_string(),
            },
        )?;
        self.request_data(request).await
    }
}
