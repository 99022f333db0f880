//! Orders and order items, including checkout fulfillment.
//!
//! Fulfillment is a three-step sequence against the document store (create
//! order, decrement stock per item, clear the cart). The store offers no
//! transactions, so the sequence runs as a saga: a failed stock decrement
//! re-increments whatever was already decremented and marks the order
//! `failed` before surfacing the error. A failed cart clear after payment is
//! reported but does not undo the order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::baas::{collections, DocStore, DocumentList, Query};
use crate::error::{AppError, AppResult};
use crate::marketplace::{carts, products, settings};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "$id", default)]
    pub id: String,
    #[serde(rename = "$createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    pub userid: String,
    #[serde(default)]
    pub nurseryid: String,
    #[serde(rename = "orderNumber", default)]
    pub order_number: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "totalAmount", default)]
    pub total_amount: f64,
    #[serde(default)]
    pub subtotal: f64,
    #[serde(rename = "commissionAmount", default)]
    pub commission_amount: f64,
    #[serde(rename = "commissionRate", default)]
    pub commission_rate: f64,
    #[serde(rename = "paymentStatus", default)]
    pub payment_status: String,
    #[serde(rename = "paymentMethod", default)]
    pub payment_method: String,
    #[serde(rename = "stripeSessionId", default)]
    pub stripe_session_id: String,
    #[serde(rename = "shippingAddress", default)]
    pub shipping_address: String,
    #[serde(rename = "customerName", default)]
    pub customer_name: String,
    #[serde(rename = "customerEmail", default)]
    pub customer_email: String,
    #[serde(rename = "customerPhone", default)]
    pub customer_phone: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(rename = "$id", default)]
    pub id: String,
    #[serde(default)]
    pub orderid: String,
    pub productid: String,
    #[serde(rename = "productName", default)]
    pub product_name: String,
    #[serde(rename = "productImage", default)]
    pub product_image: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub subtotal: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemInput {
    pub productid: String,
    pub product_name: String,
    #[serde(default)]
    pub product_image: String,
    pub price: f64,
    pub quantity: i64,
    pub subtotal: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderRequest {
    pub nurseryid: String,
    pub items: Vec<OrderItemInput>,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub stripe_session_id: Option<String>,
}

/// Commission charged on a subtotal, rounded to the nearest unit.
pub fn commission_amount(subtotal: f64, rate: f64) -> f64 {
    (subtotal * rate / 100.0).round()
}

/// Human-facing order number: ORD-<epoch millis>-<random suffix>.
pub fn order_number() -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(9)
        .collect::<String>()
        .to_uppercase();
    format!("ORD-{}-{}", Utc::now().timestamp_millis(), suffix)
}

/// Write the order row and its item rows.
pub async fn create(
    store: &DocStore,
    cache: &settings::CommissionCache,
    user_id: &str,
    req: &OrderRequest,
) -> AppResult<Order> {
    if req.items.is_empty() {
        return Err(AppError::user("empty_order", "order has no items"));
    }
    let subtotal: f64 = req.items.iter().map(|i| i.subtotal).sum();
    let rate = settings::commission_rate(store, cache).await;
    let commission = commission_amount(subtotal, rate);
    let number = order_number();

    let order: Order = store
        .create(
            collections::ORDERS,
            &json!({
                "userid": user_id,
                "nurseryid": req.nurseryid,
                "orderNumber": number,
                "status": "pending",
                "totalAmount": subtotal,
                "subtotal": subtotal,
                "commissionAmount": commission,
                "commissionRate": rate,
                "paymentStatus": "pending",
                "paymentMethod": "stripe",
                "stripeSessionId": req.stripe_session_id.clone().unwrap_or_default(),
                "shippingAddress": req.shipping_address,
                "customerName": req.customer_name,
                "customerEmail": req.customer_email,
                "customerPhone": req.customer_phone,
                "notes": "",
            }),
        )
        .await?;

    for item in &req.items {
        let _: OrderItem = store
            .create(
                collections::ORDER_ITEMS,
                &json!({
                    "orderid": order.id,
                    "productid": item.productid,
                    "productName": item.product_name,
                    "productImage": item.product_image,
                    "price": item.price,
                    "quantity": item.quantity,
                    "subtotal": item.subtotal,
                }),
            )
            .await?;
    }

    info!(order = %order.id, number = %order.order_number, "order created");
    Ok(order)
}

/// Checkout fulfillment saga: create order, decrement stock, clear cart.
pub async fn fulfill(
    store: &DocStore,
    cache: &settings::CommissionCache,
    user_id: &str,
    req: &OrderRequest,
) -> AppResult<Order> {
    let order = create(store, cache, user_id, req).await?;

    // Stock decrements, with compensation on failure
    let mut decremented: Vec<&OrderItemInput> = Vec::new();
    for item in &req.items {
        match products::adjust_stock(store, &item.productid, -item.quantity).await {
            Ok(_) => decremented.push(item),
            Err(e) => {
                error!(order = %order.id, product = %item.productid, "stock decrement failed: {e}");
                compensate_stock(store, &order, &decremented).await;
                return Err(e);
            }
        }
    }

    // Cart clear failures leave the paid order in place
    if let Err(e) = carts::clear(store, user_id).await {
        warn!(order = %order.id, "cart clear failed after order creation: {e}");
    }

    Ok(order)
}

/// Undo the decrements already applied and mark the order failed.
async fn compensate_stock(store: &DocStore, order: &Order, decremented: &[&OrderItemInput]) {
    for item in decremented {
        if let Err(e) = products::adjust_stock(store, &item.productid, item.quantity).await {
            error!(order = %order.id, product = %item.productid, "stock compensation failed: {e}");
        }
    }
    let marked: AppResult<Order> = store
        .update(
            collections::ORDERS,
            &order.id,
            &json!({ "status": "failed" }),
        )
        .await
        .map_err(AppError::from);
    if let Err(e) = marked {
        error!(order = %order.id, "failed to mark order as failed: {e}");
    }
}

pub async fn get(store: &DocStore, order_id: &str) -> AppResult<Order> {
    store
        .get(collections::ORDERS, order_id)
        .await
        .map_err(|e| AppError::not_found("order_not_found", e.to_string()))
}

pub async fn for_nursery(store: &DocStore, nursery_id: &str) -> AppResult<DocumentList<Order>> {
    let page = store
        .list(
            collections::ORDERS,
            &[
                Query::equal("nurseryid", nursery_id),
                Query::OrderDesc("$createdAt"),
            ],
        )
        .await?;
    Ok(page)
}

pub async fn for_user(store: &DocStore, user_id: &str) -> AppResult<DocumentList<Order>> {
    let page = store
        .list(
            collections::ORDERS,
            &[
                Query::equal("userid", user_id),
                Query::OrderDesc("$createdAt"),
            ],
        )
        .await?;
    Ok(page)
}

pub async fn all(store: &DocStore) -> AppResult<DocumentList<Order>> {
    let page = store
        .list(
            collections::ORDERS,
            &[Query::OrderDesc("$createdAt"), Query::Limit(100)],
        )
        .await?;
    Ok(page)
}

pub async fn items(store: &DocStore, order_id: &str) -> AppResult<Vec<OrderItem>> {
    let page: DocumentList<OrderItem> = store
        .list(collections::ORDER_ITEMS, &[Query::equal("orderid", order_id)])
        .await?;
    Ok(page.documents)
}

pub async fn set_status(store: &DocStore, order_id: &str, status: &str) -> AppResult<Order> {
    let order = store
        .update(collections::ORDERS, order_id, &json!({ "status": status }))
        .await?;
    Ok(order)
}

/// Webhook path: mark the order paid by its checkout-session id.
pub async fn mark_paid_by_checkout_session(
    store: &DocStore,
    checkout_session_id: &str,
) -> AppResult<Option<Order>> {
    let page: DocumentList<Order> = store
        .list(
            collections::ORDERS,
            &[Query::equal("stripeSessionId", checkout_session_id)],
        )
        .await?;
    let Some(order) = page.documents.into_iter().next() else {
        return Ok(None);
    };
    let updated: Order = store
        .update(
            collections::ORDERS,
            &order.id,
            &json!({ "paymentStatus": "paid" }),
        )
        .await?;
    info!(order = %updated.id, "payment recorded from webhook");
    Ok(Some(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commission_rounds_to_nearest_unit() {
        assert_eq!(commission_amount(1000.0, 10.0), 100.0);
        assert_eq!(commission_amount(999.0, 10.0), 100.0);
        assert_eq!(commission_amount(994.0, 10.0), 99.0);
        assert_eq!(commission_amount(0.0, 10.0), 0.0);
    }

    #[test]
    fn order_numbers_have_expected_shape() {
        let n = order_number();
        assert!(n.starts_with("ORD-"));
        let parts: Vec<&str> = n.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 9);
        assert!(!parts[2].chars().any(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn order_numbers_are_unique_enough() {
        let a = order_number();
        let b = order_number();
        assert_ne!(a, b);
    }
}
