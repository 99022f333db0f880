//! Contact-form submissions, stored for follow-up with status "new".

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::baas::{collections, DocStore};
use crate::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSubmission {
    #[serde(rename = "$id", default)]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
}

pub async fn submit(store: &DocStore, form: ContactForm) -> AppResult<ContactSubmission> {
    let submission = store
        .create(
            collections::CONTACT_SUBMISSIONS,
            &json!({
                "name": form.name,
                "email": form.email,
                "subject": form.subject,
                "message": form.message,
                "status": "new",
            }),
        )
        .await?;
    Ok(submission)
}
