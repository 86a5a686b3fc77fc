use serde::Deserialize;
use tracing::info;

use crate::api::{ApiClient, ApiError, FilePart, Method, RequestBody};

pub const UPLOAD_PATH: &str = "/api/upload";

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

/// An image picked in the item form, not yet sent to storage.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub make_default: bool,
}

impl PendingUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
            make_default: false,
        }
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Sends one file as multipart field `file` and returns its hosted URL.
pub async fn upload_file(api: &ApiClient, upload: &PendingUpload) -> Result<String, ApiError> {
    let body = RequestBody::Multipart(FilePart {
        field: "file".to_string(),
        file_name: upload.file_name.clone(),
        content_type: upload.content_type.clone(),
        bytes: upload.bytes.clone(),
    });

    let response = api.send(Method::Post, UPLOAD_PATH, body).await?;
    let UploadResponse { url } = serde_json::from_slice(&response)?;
    info!(file = %upload.file_name, %url, "file uploaded");
    Ok(url)
}
