//! Dashboard aggregates. These are the numbers the admin dashboards render;
//! chart rendering itself is a client concern.

use serde::Serialize;

use crate::baas::{collections, DocStore, Query};
use crate::error::AppResult;
use crate::marketplace::orders::Order;
use crate::marketplace::products;
use crate::marketplace::profiles::Profile;

#[derive(Debug, Serialize)]
pub struct MarketplaceStats {
    pub total_orders: u64,
    pub total_revenue: f64,
    pub total_commission: f64,
    pub total_nurseries: u64,
    pub total_users: u64,
    pub recent_orders: Vec<Order>,
}

#[derive(Debug, Serialize)]
pub struct NurseryStats {
    pub total_orders: u64,
    pub total_revenue: f64,
    pub total_products: usize,
    pub recent_orders: Vec<Order>,
}

/// Global marketplace totals for the super-admin dashboard.
pub async fn marketplace(store: &DocStore) -> AppResult<MarketplaceStats> {
    let orders: crate::baas::DocumentList<Order> = store
        .list(collections::ORDERS, &[Query::Limit(5000)])
        .await?;
    let total_revenue: f64 = orders.documents.iter().map(|o| o.total_amount).sum();
    let total_commission: f64 = orders.documents.iter().map(|o| o.commission_amount).sum();

    // Only the totals are needed from these collections
    let nurseries: crate::baas::DocumentList<serde_json::Value> = store
        .list(collections::NURSERIES, &[Query::Limit(1)])
        .await?;
    let users: crate::baas::DocumentList<Profile> = store
        .list(collections::PROFILES, &[Query::Limit(1)])
        .await?;

    let mut recent_orders = orders.documents;
    recent_orders.truncate(5);

    Ok(MarketplaceStats {
        total_orders: orders.total,
        total_revenue,
        total_commission,
        total_nurseries: nurseries.total,
        total_users: users.total,
        recent_orders,
    })
}

/// Per-nursery totals for the nursery-admin dashboard.
pub async fn nursery(store: &DocStore, nursery_id: &str) -> AppResult<NurseryStats> {
    let orders = crate::marketplace::orders::for_nursery(store, nursery_id).await?;
    let total_revenue: f64 = orders.documents.iter().map(|o| o.total_amount).sum();
    let inventory = products::by_nursery(store, nursery_id).await?;

    let mut recent_orders = orders.documents;
    recent_orders.truncate(5);

    Ok(NurseryStats {
        total_orders: orders.total,
        total_revenue,
        total_products: inventory.len(),
        recent_orders,
    })
}
