//! Product catalog operations. Prices are stored as strings in the product
//! collection (a constraint inherited from the storefront's schema); the
//! typed accessors parse on read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::baas::{collections, DocStore, FileStore, Query};
use crate::error::{AppError, AppResult};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "$id", default)]
    pub id: String,
    #[serde(rename = "$createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub imageurl: Option<String>,
    #[serde(default)]
    pub userid: String,
    #[serde(default)]
    pub nurseryid: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(rename = "isAvailable", default = "default_true")]
    pub is_available: bool,
    #[serde(rename = "careInstructions", default)]
    pub care_instructions: String,
    #[serde(rename = "climateZone", default)]
    pub climate_zone: String,
    #[serde(default)]
    pub season: String,
    #[serde(default)]
    pub sku: String,
}

impl Product {
    pub fn price_value(&self) -> f64 {
        self.price.parse().unwrap_or(0.0)
    }
}

/// Inline image payload on product create/edit forms.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageUpload {
    pub filename: String,
    pub data_base64: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub care_instructions: String,
    #[serde(default)]
    pub climate_zone: String,
    #[serde(default)]
    pub season: String,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditProduct {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub documents: Vec<T>,
    pub total: u64,
    pub page_count: u64,
}

async fn upload_image(files: &FileStore, image: &ImageUpload) -> AppResult<String> {
    use base64::Engine;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(image.data_base64.as_bytes())
        .map_err(|_| AppError::user("bad_image", "image is not valid base64"))?;
    let file_id = files.upload(&image.filename, bytes).await?;
    Ok(files.view_url(&file_id))
}

pub async fn list(store: &DocStore) -> AppResult<Vec<Product>> {
    let page: crate::baas::DocumentList<Product> = store.list(collections::PRODUCTS, &[]).await?;
    Ok(page.documents)
}

/// Full catalog, newest first.
pub async fn list_all(store: &DocStore) -> AppResult<Vec<Product>> {
    let page: crate::baas::DocumentList<Product> = store
        .list(
            collections::PRODUCTS,
            &[Query::Limit(1000), Query::OrderDesc("$createdAt")],
        )
        .await?;
    Ok(page.documents)
}

pub async fn list_paginated(store: &DocStore, page: u64, limit: u64) -> AppResult<Page<Product>> {
    let limit = limit.clamp(1, 100);
    let offset = page.saturating_sub(1) * limit;
    let rows: crate::baas::DocumentList<Product> = store
        .list(
            collections::PRODUCTS,
            &[
                Query::Limit(limit),
                Query::Offset(offset),
                Query::OrderDesc("$createdAt"),
            ],
        )
        .await?;
    Ok(Page {
        total: rows.total,
        page_count: rows.total.div_ceil(limit),
        documents: rows.documents,
    })
}

pub async fn get(store: &DocStore, product_id: &str) -> AppResult<Product> {
    store
        .get(collections::PRODUCTS, product_id)
        .await
        .map_err(|e| AppError::not_found("product_not_found", e.to_string()))
}

pub async fn by_nursery(store: &DocStore, nursery_id: &str) -> AppResult<Vec<Product>> {
    let page: crate::baas::DocumentList<Product> = store
        .list(
            collections::PRODUCTS,
            &[
                Query::equal("nurseryid", nursery_id),
                Query::OrderDesc("$createdAt"),
            ],
        )
        .await?;
    Ok(page.documents)
}

pub async fn create(
    store: &DocStore,
    files: &FileStore,
    owner_id: &str,
    nursery_id: &str,
    new: NewProduct,
) -> AppResult<Product> {
    let imageurl = match &new.image {
        Some(image) => Some(upload_image(files, image).await?),
        None => None,
    };
    let product: Product = store
        .create(
            collections::PRODUCTS,
            &json!({
                "name": new.name,
                "price": new.price.to_string(),
                "desc": new.desc,
                "category": new.category,
                "imageurl": imageurl,
                "userid": owner_id,
                "nurseryid": nursery_id,
                "stock": new.stock,
                "isAvailable": new.is_available,
                "careInstructions": new.care_instructions,
                "climateZone": new.climate_zone,
                "season": new.season,
                "sku": new.sku,
            }),
        )
        .await?;
    info!(product = %product.id, nursery = nursery_id, "product created");
    Ok(product)
}

/// Update a product; the existing image is kept unless a new one is uploaded.
pub async fn edit(
    store: &DocStore,
    files: &FileStore,
    product_id: &str,
    edit: EditProduct,
) -> AppResult<Product> {
    let current = get(store, product_id).await?;
    let imageurl = match &edit.image {
        Some(image) => Some(upload_image(files, image).await?),
        None => current.imageurl.clone(),
    };
    let product = store
        .update(
            collections::PRODUCTS,
            product_id,
            &json!({
                "name": edit.name,
                "price": edit.price.to_string(),
                "desc": edit.desc,
                "category": edit.category,
                "imageurl": imageurl,
            }),
        )
        .await?;
    Ok(product)
}

pub async fn remove(store: &DocStore, product_id: &str) -> AppResult<()> {
    store.delete(collections::PRODUCTS, product_id).await?;
    info!(product = product_id, "product deleted");
    Ok(())
}

/// Read-modify-write stock adjustment. A decrement below zero is rejected
/// with an insufficient-stock conflict before anything is written.
pub async fn adjust_stock(store: &DocStore, product_id: &str, delta: i64) -> AppResult<Product> {
    let current = get(store, product_id).await?;
    let new_stock = current.stock + delta;
    if new_stock < 0 {
        return Err(AppError::conflict(
            "insufficient_stock",
            format!("Insufficient stock for product {}", current.name),
        ));
    }
    let product = store
        .update(
            collections::PRODUCTS,
            product_id,
            &json!({ "stock": new_stock }),
        )
        .await?;
    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_parses_stored_string() {
        let p: Product = serde_json::from_value(json!({
            "$id": "p1",
            "name": "Monstera",
            "price": "249.50",
        }))
        .unwrap();
        assert_eq!(p.price_value(), 249.50);
        assert!(p.is_available, "availability defaults to true");
    }

    #[test]
    fn garbled_price_reads_as_zero() {
        let p: Product = serde_json::from_value(json!({
            "$id": "p2",
            "name": "Fern",
            "price": "n/a",
        }))
        .unwrap();
        assert_eq!(p.price_value(), 0.0);
    }
}
