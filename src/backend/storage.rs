//! Object storage for uploaded resume files

use crate::backend::client::BackendClient;
use crate::error::{Result, ResumeStudioError};
use crate::input::file_detector::FileType;
use chrono::Utc;
use log::info;
use reqwest::Method;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct FileStorage {
    client: BackendClient,
    bucket: String,
}

/// Reject anything the upload form does not accept, before any IO
pub fn validate_upload(path: &Path) -> Result<FileType> {
    let file_type = FileType::from_path(path);
    if file_type.is_uploadable() {
        Ok(file_type)
    } else {
        Err(ResumeStudioError::UnsupportedFormat(path.display().to_string()))
    }
}

/// `{user_id}/{unix_millis}_{file_name}` with unsafe characters replaced
pub fn object_path(user_id: &str, file_name: &str, unix_millis: i64) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    format!("{}/{}_{}", user_id, unix_millis, safe)
}

impl FileStorage {
    pub fn new(client: BackendClient, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Upload a local file and return its object path within the bucket
    pub async fn upload(&self, user_id: &str, path: &Path) -> Result<String> {
        let file_type = validate_upload(path)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ResumeStudioError::InvalidInput(format!("Invalid file name: {}", path.display())))?;

        let bytes = tokio::fs::read(path).await?;
        self.upload_bytes(user_id, file_name, bytes, file_type).await
    }

    pub async fn upload_bytes(
        &self,
        user_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
        file_type: FileType,
    ) -> Result<String> {
        if !file_type.is_uploadable() {
            return Err(ResumeStudioError::UnsupportedFormat(file_name.to_string()));
        }

        let object = object_path(user_id, file_name, Utc::now().timestamp_millis());
        let url = self
            .client
            .endpoint(&format!("storage/v1/object/{}/{}", self.bucket, object))?;
        let size = bytes.len();
        let request = self
            .client
            .request(Method::POST, url)
            .header("Content-Type", file_type.content_type())
            .header("x-upsert", "false")
            .body(bytes);

        self.client.send(request).await?;
        info!("Uploaded {} ({} bytes) to {}/{}", file_name, size, self.bucket, object);
        Ok(object)
    }

    pub async fn download(&self, object: &str) -> Result<Vec<u8>> {
        let url = self
            .client
            .endpoint(&format!("storage/v1/object/{}/{}", self.bucket, object))?;
        let response = self.client.send(self.client.request(Method::GET, url)).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
