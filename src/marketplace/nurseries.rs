//! Nursery records: one per nursery-admin account.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::baas::{collections, DocStore, Query};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nursery {
    #[serde(rename = "$id", default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ownerid: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "climateZone", default)]
    pub climate_zone: String,
    #[serde(rename = "isActive", default)]
    pub is_active: bool,
    #[serde(rename = "commissionRate", default)]
    pub commission_rate: f64,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NurseryForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub climate_zone: String,
}

pub async fn for_owner(store: &DocStore, owner_id: &str) -> AppResult<Option<Nursery>> {
    let page: crate::baas::DocumentList<Nursery> = store
        .list(collections::NURSERIES, &[Query::equal("ownerid", owner_id)])
        .await?;
    Ok(page.documents.into_iter().next())
}

pub async fn all(store: &DocStore) -> AppResult<Vec<Nursery>> {
    let page: crate::baas::DocumentList<Nursery> =
        store.list(collections::NURSERIES, &[Query::Limit(100)]).await?;
    Ok(page.documents)
}

/// Create the owner's nursery; an owner has at most one.
pub async fn create(store: &DocStore, owner_id: &str, form: NurseryForm) -> AppResult<Nursery> {
    if for_owner(store, owner_id).await?.is_some() {
        return Err(AppError::conflict(
            "nursery_exists",
            "You already have a nursery",
        ));
    }
    let nursery: Nursery = store
        .create(
            collections::NURSERIES,
            &json!({
                "name": form.name,
                "ownerid": owner_id,
                "description": form.description,
                "address": form.address,
                "city": form.city,
                "state": form.state,
                "pincode": form.pincode,
                "phone": form.phone,
                "email": form.email,
                "climateZone": form.climate_zone,
                "isActive": true,
                "commissionRate": crate::marketplace::settings::DEFAULT_COMMISSION_RATE,
                "latitude": 0.0,
                "longitude": 0.0,
            }),
        )
        .await?;
    info!(nursery = %nursery.id, owner = owner_id, "nursery created");
    Ok(nursery)
}

pub async fn update(store: &DocStore, nursery_id: &str, form: NurseryForm) -> AppResult<Nursery> {
    let nursery = store
        .update(
            collections::NURSERIES,
            nursery_id,
            &json!({
                "name": form.name,
                "description": form.description,
                "address": form.address,
                "city": form.city,
                "state": form.state,
                "pincode": form.pincode,
                "phone": form.phone,
                "email": form.email,
                "climateZone": form.climate_zone,
            }),
        )
        .await?;
    Ok(nursery)
}
