use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;

/// REST client for the file-storage bucket holding product images.
#[derive(Clone)]
pub struct FileStore {
    http: reqwest::Client,
    endpoint: String,
    project_id: String,
    api_key: String,
    bucket_id: String,
}

#[derive(Debug, Deserialize)]
struct FileRecord {
    #[serde(rename = "$id")]
    id: String,
}

impl FileStore {
    pub fn new(http: reqwest::Client, cfg: &Config) -> Self {
        Self {
            http,
            endpoint: cfg.baas_endpoint.trim_end_matches('/').to_string(),
            project_id: cfg.baas_project_id.clone(),
            api_key: cfg.baas_api_key.clone(),
            bucket_id: cfg.baas_bucket_id.clone(),
        }
    }

    fn bucket_url(&self) -> String {
        format!(
            "{}/storage/buckets/{}/files",
            self.endpoint,
            urlencoding::encode(&self.bucket_id)
        )
    }

    /// Upload raw bytes and return the new file id.
    pub async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String> {
        let file_id = Uuid::new_v4().simple().to_string();
        let form = reqwest::multipart::Form::new()
            .part("fileId", reqwest::multipart::Part::text(file_id.clone()))
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string()),
            );
        let resp = self
            .http
            .post(self.bucket_url())
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .context("file upload request failed")?;
        if !resp.status().is_success() {
            return Err(anyhow!("file upload failed: HTTP {}", resp.status()));
        }
        let record: FileRecord = resp.json().await.context("file upload: bad body")?;
        debug!(file = %record.id, filename, "file uploaded");
        Ok(record.id)
    }

    /// Publicly viewable URL for an uploaded file; stored on product rows.
    pub fn view_url(&self, file_id: &str) -> String {
        format!(
            "{}/storage/buckets/{}/files/{}/view?project={}",
            self.endpoint,
            urlencoding::encode(&self.bucket_id),
            urlencoding::encode(file_id),
            urlencoding::encode(&self.project_id)
        )
    }
}
