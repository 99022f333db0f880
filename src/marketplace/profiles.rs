//! User profile rows: the durable record behind each account, including the
//! role label. The role is assigned at signup and changes only through the
//! super-admin promotion/demotion path below. Credentials live with the
//! identity provider, never on the profile row.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::access::Role;
use crate::baas::{collections, DocStore, DocumentList, Query};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "$id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub address: String,
}

impl Profile {
    /// Role label resolved through the shared classification function;
    /// unrecognized labels read as "not yet determined".
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

pub async fn by_email(store: &DocStore, email: &str) -> AppResult<Option<Profile>> {
    let page: DocumentList<Profile> = store
        .list(collections::PROFILES, &[Query::equal("email", email)])
        .await?;
    Ok(page.documents.into_iter().next())
}

/// Create the profile row at signup with the default role.
pub async fn create(
    store: &DocStore,
    name: &str,
    email: &str,
    phone: &str,
    role: Role,
) -> AppResult<Profile> {
    let profile: Profile = store
        .create(
            collections::PROFILES,
            &json!({
                "name": name,
                "email": email,
                "phone": phone,
                "role": role.as_str(),
            }),
        )
        .await?;
    info!(profile = %profile.id, role = role.as_str(), "profile created");
    Ok(profile)
}

pub async fn update_by_email(
    store: &DocStore,
    email: &str,
    update: &ProfileUpdate,
) -> AppResult<Profile> {
    let Some(profile) = by_email(store, email).await? else {
        return Err(AppError::not_found("profile_not_found", "User profile not found"));
    };
    let mut data = serde_json::Map::new();
    if let Some(name) = &update.name {
        data.insert("name".into(), json!(name));
    }
    if let Some(phone) = &update.phone {
        data.insert("phone".into(), json!(phone));
    }
    if let Some(address) = &update.address {
        data.insert("address".into(), json!(address));
    }
    let updated = store
        .update(collections::PROFILES, &profile.id, &data)
        .await?;
    Ok(updated)
}

pub async fn all(store: &DocStore) -> AppResult<DocumentList<Profile>> {
    let page = store
        .list(collections::PROFILES, &[Query::Limit(100)])
        .await?;
    Ok(page)
}

/// Promotion/demotion: the only mutation path for the role label. The new
/// label is always written in canonical form.
pub async fn set_role(store: &DocStore, profile_id: &str, role: Role) -> AppResult<Profile> {
    let updated: Profile = store
        .update(
            collections::PROFILES,
            profile_id,
            &json!({ "role": role.as_str() }),
        )
        .await?;
    info!(profile = profile_id, role = role.as_str(), "role updated");
    Ok(updated)
}

pub async fn remove(store: &DocStore, profile_id: &str) -> AppResult<()> {
    store.delete(collections::PROFILES, profile_id).await?;
    info!(profile = profile_id, "profile deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_role_uses_shared_classification() {
        let p: Profile = serde_json::from_value(json!({
            "$id": "r1",
            "email": "a@b.c",
            "role": "NurseryAdmin",
        }))
        .unwrap();
        assert_eq!(p.role(), Some(Role::NurseryAdmin));

        let p: Profile = serde_json::from_value(json!({
            "$id": "r2",
            "email": "d@e.f",
            "role": "admin",
        }))
        .unwrap();
        assert_eq!(p.role(), None);
    }
}
