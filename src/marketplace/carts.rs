//! Shopping cart rows. Quantity and price are stored as strings in the cart
//! collection; adding an item a second time merges onto the existing row.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::baas::{collections, DocStore, Query};
use crate::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(rename = "$id", default)]
    pub id: String,
    pub userid: String,
    pub productid: String,
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub imageurl: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub nurseryid: Option<String>,
}

impl CartItem {
    pub fn quantity_value(&self) -> i64 {
        self.quantity.parse().unwrap_or(0)
    }

    pub fn price_value(&self) -> f64 {
        self.price.parse().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddToCart {
    pub productid: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub imageurl: String,
    pub quantity: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub nurseryid: Option<String>,
}

pub async fn items_for(store: &DocStore, user_id: &str) -> AppResult<Vec<CartItem>> {
    let page: crate::baas::DocumentList<CartItem> = store
        .list(collections::CARTS, &[Query::equal("userid", user_id)])
        .await?;
    Ok(page.documents)
}

/// Add an item, merging quantity onto an existing row for the same product.
pub async fn add(store: &DocStore, user_id: &str, item: AddToCart) -> AppResult<CartItem> {
    let existing: crate::baas::DocumentList<CartItem> = store
        .list(
            collections::CARTS,
            &[
                Query::equal("userid", user_id),
                Query::equal("productid", item.productid.as_str()),
            ],
        )
        .await?;

    if let Some(row) = existing.documents.first() {
        let merged = row.quantity_value() + item.quantity;
        let updated = store
            .update(
                collections::CARTS,
                &row.id,
                &json!({ "quantity": merged.to_string() }),
            )
            .await?;
        return Ok(updated);
    }

    let created: CartItem = store
        .create(
            collections::CARTS,
            &json!({
                "userid": user_id,
                "productid": item.productid,
                "name": item.name,
                "price": item.price.to_string(),
                "imageurl": item.imageurl,
                "quantity": item.quantity.to_string(),
                "category": item.category,
                "nurseryid": item.nurseryid,
            }),
        )
        .await?;
    Ok(created)
}

pub async fn set_quantity(store: &DocStore, item_id: &str, quantity: i64) -> AppResult<CartItem> {
    let updated = store
        .update(
            collections::CARTS,
            item_id,
            &json!({ "quantity": quantity.to_string() }),
        )
        .await?;
    Ok(updated)
}

pub async fn remove(store: &DocStore, item_id: &str) -> AppResult<()> {
    store.delete(collections::CARTS, item_id).await?;
    Ok(())
}

/// Delete every cart row for the user. Returns the number of rows removed.
pub async fn clear(store: &DocStore, user_id: &str) -> AppResult<usize> {
    let items = items_for(store, user_id).await?;
    let count = items.len();
    for item in &items {
        store.delete(collections::CARTS, &item.id).await?;
    }
    info!(user = user_id, removed = count, "cart cleared");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stringly_quantities_parse_on_read() {
        let item: CartItem = serde_json::from_value(json!({
            "$id": "c1",
            "userid": "u1",
            "productid": "p1",
            "name": "Snake Plant",
            "price": "120",
            "quantity": "3",
        }))
        .unwrap();
        assert_eq!(item.quantity_value(), 3);
        assert_eq!(item.price_value(), 120.0);
    }

    #[test]
    fn garbled_quantity_reads_as_zero() {
        let item: CartItem = serde_json::from_value(json!({
            "$id": "c2",
            "userid": "u1",
            "productid": "p2",
            "name": "Cactus",
            "quantity": "many",
        }))
        .unwrap();
        assert_eq!(item.quantity_value(), 0);
    }
}
