//! Receipt upload client methods

use super::{AssistClient, ClientError, FormPart, PendingRequest};
use bytes::Bytes;
use serde_json::Value as JsonValue;
#[cfg(not(target_arch = "wasm32"))]
use tracing::debug;

/// Multipart field the backend reads the receipt from
pub const RECEIPT_FIELD: &str = "file";

impl AssistClient {
    /// Upload a receipt image or PDF; extraction happens server-side
    pub async fn upload_receipt(
        &self,
        file_name: &str,
        bytes: impl Into<Bytes>,
        mime: Option<&str>,
    ) -> Result<JsonValue, ClientError> {
        let request = PendingRequest::post("/receipt/upload/").multipart(vec![FormPart::file(
            RECEIPT_FIELD,
            file_name,
            bytes,
            mime,
        )]);
        self.request_data(request).await
    }

    /// Read a receipt from disk and upload it, guessing the content type
    /// from the file extension
    #[cfg(not(target_arch = "wasm32"))]
    pub async fn upload_receipt_file(
        &self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<JsonValue, ClientError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                ClientError::Configuration(format!("{} has no file name", path.display()))
            })?;
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            ClientError::Storage(format!("failed to read {}: {e}", path.display()))
        })?;
        debug!(file = %path.display(), size = bytes.len(), "Uploading receipt");
        self.upload_receipt(file_name, bytes, receipt_mime(path))
            .await
    }
}

/// Content type for the receipt formats the backend accepts
pub fn receipt_mime(path: &std::path::Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}
