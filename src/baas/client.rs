use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;

use super::query::Query;

/// REST client for the document store. Cheap to clone; holds a shared
/// connection pool.
#[derive(Clone)]
pub struct DocStore {
    http: reqwest::Client,
    endpoint: String,
    project_id: String,
    api_key: String,
    database_id: String,
}

/// List-endpoint envelope: total row count plus the current page of documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentList<T> {
    pub total: u64,
    pub documents: Vec<T>,
}

#[derive(Serialize)]
struct CreateBody<'a, T: Serialize> {
    #[serde(rename = "documentId")]
    document_id: String,
    data: &'a T,
}

#[derive(Serialize)]
struct UpdateBody<'a, T: Serialize> {
    data: &'a T,
}

impl DocStore {
    pub fn new(http: reqwest::Client, cfg: &Config) -> Self {
        Self {
            http,
            endpoint: cfg.baas_endpoint.trim_end_matches('/').to_string(),
            project_id: cfg.baas_project_id.clone(),
            api_key: cfg.baas_api_key.clone(),
            database_id: cfg.baas_database_id.clone(),
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.endpoint,
            urlencoding::encode(&self.database_id),
            urlencoding::encode(collection)
        )
    }

    fn document_url(&self, collection: &str, document_id: &str) -> String {
        format!(
            "{}/{}",
            self.collection_url(collection),
            urlencoding::encode(document_id)
        )
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
    }

    async fn check(resp: reqwest::Response, what: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(anyhow!("{} failed: HTTP {} {}", what, status, body))
    }

    pub async fn list<T: DeserializeOwned>(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<DocumentList<T>> {
        let params: Vec<(&str, String)> =
            queries.iter().map(|q| ("queries[]", q.to_wire())).collect();
        let resp = self
            .request(reqwest::Method::GET, self.collection_url(collection))
            .query(&params)
            .send()
            .await
            .with_context(|| format!("list {} request failed", collection))?;
        let resp = Self::check(resp, "list").await?;
        let list = resp
            .json()
            .await
            .with_context(|| format!("list {}: bad body", collection))?;
        Ok(list)
    }

    pub async fn get<T: DeserializeOwned>(&self, collection: &str, document_id: &str) -> Result<T> {
        let resp = self
            .request(reqwest::Method::GET, self.document_url(collection, document_id))
            .send()
            .await
            .with_context(|| format!("get {}/{} request failed", collection, document_id))?;
        let resp = Self::check(resp, "get").await?;
        Ok(resp.json().await.context("get: bad body")?)
    }

    /// Create a document under a client-generated id.
    pub async fn create<T: DeserializeOwned>(
        &self,
        collection: &str,
        data: &impl Serialize,
    ) -> Result<T> {
        let document_id = Uuid::new_v4().simple().to_string();
        let body = CreateBody { document_id: document_id.clone(), data };
        let resp = self
            .request(reqwest::Method::POST, self.collection_url(collection))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("create in {} request failed", collection))?;
        let resp = Self::check(resp, "create").await?;
        debug!(collection, document = %document_id, "document created");
        Ok(resp.json().await.context("create: bad body")?)
    }

    pub async fn update<T: DeserializeOwned>(
        &self,
        collection: &str,
        document_id: &str,
        data: &impl Serialize,
    ) -> Result<T> {
        let body = UpdateBody { data };
        let resp = self
            .request(reqwest::Method::PATCH, self.document_url(collection, document_id))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("update {}/{} request failed", collection, document_id))?;
        let resp = Self::check(resp, "update").await?;
        Ok(resp.json().await.context("update: bad body")?)
    }

    pub async fn delete(&self, collection: &str, document_id: &str) -> Result<()> {
        let resp = self
            .request(reqwest::Method::DELETE, self.document_url(collection, document_id))
            .send()
            .await
            .with_context(|| format!("delete {}/{} request failed", collection, document_id))?;
        Self::check(resp, "delete").await?;
        debug!(collection, document = %document_id, "document deleted");
        Ok(())
    }
}
