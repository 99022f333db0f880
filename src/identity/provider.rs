use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Session record as issued by the identity provider. Only the id matters to
/// this service; it becomes the opaque session-indicator cookie value.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSession {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "userId", default)]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
}

/// Seam over the hosted identity provider so handlers and tests are not tied
/// to one vendor's wire format.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn create_account(&self, name: &str, email: &str, password: &str) -> Result<Account>;
    async fn create_session(&self, email: &str, password: &str) -> Result<ProviderSession>;
    /// None when the session id no longer resolves to a live account.
    async fn current_account(&self, session_id: &str) -> Result<Option<Account>>;
    async fn delete_session(&self, session_id: &str) -> Result<()>;
}

/// REST client for the BaaS account API.
#[derive(Clone)]
pub struct BaasAuthProvider {
    http: reqwest::Client,
    endpoint: String,
    project_id: String,
    api_key: String,
}

impl BaasAuthProvider {
    pub fn new(http: reqwest::Client, endpoint: &str, project_id: &str, api_key: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
    }
}

#[async_trait]
impl AuthProvider for BaasAuthProvider {
    async fn create_account(&self, name: &str, email: &str, password: &str) -> Result<Account> {
        let resp = self
            .request(reqwest::Method::POST, "/account")
            .json(&serde_json::json!({
                "userId": Uuid::new_v4().simple().to_string(),
                "email": email,
                "password": password,
                "name": name,
            }))
            .send()
            .await
            .context("account create request failed")?;
        if !resp.status().is_success() {
            return Err(anyhow!("account create failed: HTTP {}", resp.status()));
        }
        let acc: Account = resp.json().await.context("account create: bad body")?;
        debug!(account = %acc.id, "provider account created");
        Ok(acc)
    }

    async fn create_session(&self, email: &str, password: &str) -> Result<ProviderSession> {
        let resp = self
            .request(reqwest::Method::POST, "/account/sessions/email")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .context("session create request failed")?;
        if !resp.status().is_success() {
            return Err(anyhow!("invalid_credentials"));
        }
        let session: ProviderSession = resp.json().await.context("session create: bad body")?;
        debug!(session = %session.id, "provider session created");
        Ok(session)
    }

    async fn current_account(&self, session_id: &str) -> Result<Option<Account>> {
        let resp = self
            .request(reqwest::Method::GET, "/account")
            .header("X-Appwrite-Session", session_id)
            .send()
            .await
            .context("account get request failed")?;
        if resp.status() == reqwest::StatusCode::UNAUTHORIZED
            || resp.status() == reqwest::StatusCode::NOT_FOUND
        {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(anyhow!("account get failed: HTTP {}", resp.status()));
        }
        let acc: Account = resp.json().await.context("account get: bad body")?;
        Ok(Some(acc))
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        let resp = self
            .request(reqwest::Method::DELETE, "/account/sessions/current")
            .header("X-Appwrite-Session", session_id)
            .send()
            .await
            .context("session delete request failed")?;
        if !resp.status().is_success() {
            return Err(anyhow!("session delete failed: HTTP {}", resp.status()));
        }
        Ok(())
    }
}
