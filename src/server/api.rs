//! API routes reached directly by the storefront client and the payment
//! gateway. These bypass the page gate, so each handler does its own
//! validation: body shape for checkout, the signature header for the
//! webhook, and the session cookie for order fulfillment.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::marketplace::orders;
use crate::payments::{self, LineItem, WebhookEvent};

use super::{require_account, AppState};

#[derive(Debug, Deserialize)]
pub struct CheckoutItemPayload {
    pub name: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutPayload {
    pub items: Vec<CheckoutItemPayload>,
    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutPayload>,
) -> Result<impl IntoResponse, AppError> {
    if payload.items.is_empty() {
        return Err(AppError::user("invalid_items", "Invalid items"));
    }
    let line_items: Vec<LineItem> = payload
        .items
        .iter()
        .map(|i| LineItem {
            name: i.name.clone(),
            image_url: i.image_url.clone(),
            unit_price: i.price,
            quantity: i.quantity.unwrap_or(1).max(1),
        })
        .collect();

    let origin = state.config.public_origin.trim_end_matches('/');
    let success_url = format!("{origin}/success?session_id={{CHECKOUT_SESSION_ID}}");
    let cancel_url = format!("{origin}/cancel");
    let user_id = payload.user_id.as_deref().unwrap_or("guest");

    let session = state
        .gateway
        .create_checkout_session(&line_items, &success_url, &cancel_url, user_id)
        .await
        .map_err(|e| AppError::payment("checkout_failed", e.to_string()))?;
    Ok(Json(json!({"id": session.id, "url": session.url})))
}

/// Signed callback from the payment gateway. A bad signature is a 400; a
/// verified `checkout.session.completed` marks the matching order paid.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if let Err(e) = payments::verify_signature(
        &body,
        signature,
        &state.config.stripe_webhook_secret,
        Utc::now().timestamp(),
    ) {
        return (StatusCode::BAD_REQUEST, format!("Webhook Error: {e}")).into_response();
    }

    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(ev) => ev,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, format!("Webhook Error: {e}")).into_response();
        }
    };

    if event.kind == "checkout.session.completed" {
        let session_id = event
            .data
            .object
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        info!(session = %session_id, "payment completed");
        match orders::mark_paid_by_checkout_session(&state.store, &session_id).await {
            Ok(Some(_)) => {}
            Ok(None) => warn!(session = %session_id, "no order for completed checkout session"),
            // delivery is retried by the gateway; the update is idempotent
            Err(e) => error!("failed to record payment: {e}"),
        }
    }

    (StatusCode::OK, "OK").into_response()
}

/// Order fulfillment invoked by the storefront after a successful checkout:
/// create order, decrement stock, clear cart (compensating on failure).
pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<orders::OrderRequest>,
) -> Result<impl IntoResponse, AppError> {
    let account = require_account(&state, &headers).await?;
    let order = orders::fulfill(&state.store, &state.commission, &account.id, &req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"status":"ok","order": order})),
    ))
}
