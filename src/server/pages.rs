//! Handlers for the page routes: public storefront resources and the three
//! role-gated dashboard surfaces. Each handler re-checks identity (and role,
//! where the data demands it) against the identity provider; the routing gate
//! in front of these paths is a navigation convenience, not the authority.

use axum::extract::{Path, Query as UrlQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::access::Role;
use crate::error::{AppError, AppResult};
use crate::marketplace::{carts, contact, nurseries, orders, products, profiles, settings, stats};

use super::{require_account, require_role, AppState};

const ORDER_STATUSES: &[&str] = &["pending", "processing", "shipped", "delivered", "cancelled"];

// ---------------------------------------------------------------------------
// public storefront
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ShopQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

pub async fn shop(
    State(state): State<AppState>,
    UrlQuery(q): UrlQuery<ShopQuery>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(page) = q.page {
        let rows =
            products::list_paginated(&state.store, page.max(1), q.limit.unwrap_or(12)).await?;
        return Ok(Json(json!({
            "status": "ok",
            "products": rows.documents,
            "total": rows.total,
            "page_count": rows.page_count,
        })));
    }
    let rows = products::list_all(&state.store).await?;
    Ok(Json(json!({"status":"ok","products": rows})))
}

pub async fn shop_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let product = products::get(&state.store, &id).await?;
    Ok(Json(json!({"status":"ok","product": product})))
}

pub async fn contact_submit(
    State(state): State<AppState>,
    Json(form): Json<contact::ContactForm>,
) -> Result<impl IntoResponse, AppError> {
    let submission = contact::submit(&state.store, form).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({"status":"ok","submission": submission.id})),
    ))
}

// ---------------------------------------------------------------------------
// customer dashboard
// ---------------------------------------------------------------------------

pub async fn user_dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let account = require_account(&state, &headers).await?;
    let profile = profiles::by_email(&state.store, &account.email).await?;
    let orders = orders::for_user(&state.store, &account.id).await?;
    Ok(Json(json!({
        "status": "ok",
        "account": account,
        "profile": profile,
        "total_orders": orders.total,
        "recent_orders": orders.documents.into_iter().take(5).collect::<Vec<_>>(),
    })))
}

pub async fn user_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let account = require_account(&state, &headers).await?;
    let orders = orders::for_user(&state.store, &account.id).await?;
    Ok(Json(json!({"status":"ok","orders": orders.documents, "total": orders.total})))
}

pub async fn user_order_items(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let account = require_account(&state, &headers).await?;
    let order = orders::get(&state.store, &order_id).await?;
    if order.userid != account.id {
        return Err(AppError::forbidden("not_your_order", "order belongs to another account"));
    }
    let items = orders::items(&state.store, &order_id).await?;
    Ok(Json(json!({"status":"ok","order": order, "items": items})))
}

pub async fn user_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let account = require_account(&state, &headers).await?;
    let profile = profiles::by_email(&state.store, &account.email).await?;
    Ok(Json(json!({"status":"ok","profile": profile})))
}

pub async fn user_profile_update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<profiles::ProfileUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let account = require_account(&state, &headers).await?;
    let profile = profiles::update_by_email(&state.store, &account.email, &update).await?;
    Ok(Json(json!({"status":"ok","profile": profile})))
}

pub async fn cart_list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let account = require_account(&state, &headers).await?;
    let items = carts::items_for(&state.store, &account.id).await?;
    let subtotal: f64 = items
        .iter()
        .map(|i| i.price_value() * i.quantity_value() as f64)
        .sum();
    Ok(Json(json!({"status":"ok","items": items, "subtotal": subtotal})))
}

pub async fn cart_add(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(item): Json<carts::AddToCart>,
) -> Result<impl IntoResponse, AppError> {
    let account = require_account(&state, &headers).await?;
    if item.quantity <= 0 {
        return Err(AppError::user("bad_quantity", "quantity must be positive"));
    }
    let row = carts::add(&state.store, &account.id, item).await?;
    Ok((StatusCode::CREATED, Json(json!({"status":"ok","item": row}))))
}

#[derive(Debug, Deserialize)]
pub struct QuantityPayload {
    pub quantity: i64,
}

pub async fn cart_set_quantity(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(item_id): Path<String>,
    Json(payload): Json<QuantityPayload>,
) -> Result<impl IntoResponse, AppError> {
    let account = require_account(&state, &headers).await?;
    if payload.quantity <= 0 {
        return Err(AppError::user("bad_quantity", "quantity must be positive"));
    }
    owned_cart_row(&state, &account.id, &item_id).await?;
    let row = carts::set_quantity(&state.store, &item_id, payload.quantity).await?;
    Ok(Json(json!({"status":"ok","item": row})))
}

pub async fn cart_remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(item_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let account = require_account(&state, &headers).await?;
    owned_cart_row(&state, &account.id, &item_id).await?;
    carts::remove(&state.store, &item_id).await?;
    Ok(Json(json!({"status":"ok"})))
}

pub async fn cart_clear(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let account = require_account(&state, &headers).await?;
    let removed = carts::clear(&state.store, &account.id).await?;
    Ok(Json(json!({"status":"ok","removed": removed})))
}

async fn owned_cart_row(state: &AppState, user_id: &str, item_id: &str) -> AppResult<()> {
    let items = carts::items_for(&state.store, user_id).await?;
    if !items.iter().any(|i| i.id == item_id) {
        return Err(AppError::not_found("cart_item_not_found", "no such cart item"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// nursery admin
// ---------------------------------------------------------------------------

async fn require_nursery(
    state: &AppState,
    headers: &HeaderMap,
) -> AppResult<(crate::identity::Account, nurseries::Nursery)> {
    let (account, _) = require_role(state, headers, Role::NurseryAdmin).await?;
    let Some(nursery) = nurseries::for_owner(&state.store, &account.id).await? else {
        return Err(AppError::not_found(
            "nursery_not_set_up",
            "set up your nursery first",
        ));
    };
    Ok((account, nursery))
}

pub async fn nursery_home(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let (account, _) = require_role(&state, &headers, Role::NurseryAdmin).await?;
    let Some(nursery) = nurseries::for_owner(&state.store, &account.id).await? else {
        return Ok(Json(json!({"status":"ok","nursery": null, "setup_required": true})));
    };
    let stats = stats::nursery(&state.store, &nursery.id).await?;
    Ok(Json(json!({"status":"ok","nursery": nursery, "stats": stats})))
}

pub async fn nursery_inventory(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let (_, nursery) = require_nursery(&state, &headers).await?;
    let inventory = products::by_nursery(&state.store, &nursery.id).await?;
    Ok(Json(json!({"status":"ok","products": inventory})))
}

pub async fn nursery_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let (_, nursery) = require_nursery(&state, &headers).await?;
    let orders = orders::for_nursery(&state.store, &nursery.id).await?;
    Ok(Json(json!({"status":"ok","orders": orders.documents, "total": orders.total})))
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub status: String,
}

pub async fn nursery_order_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
    Json(payload): Json<StatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let (_, nursery) = require_nursery(&state, &headers).await?;
    if !ORDER_STATUSES.contains(&payload.status.as_str()) {
        return Err(AppError::user("bad_status", "unknown order status"));
    }
    let order = orders::get(&state.store, &order_id).await?;
    if order.nurseryid != nursery.id {
        return Err(AppError::forbidden("not_your_order", "order belongs to another nursery"));
    }
    let order = orders::set_status(&state.store, &order_id, &payload.status).await?;
    Ok(Json(json!({"status":"ok","order": order})))
}

pub async fn nursery_add_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(new): Json<products::NewProduct>,
) -> Result<impl IntoResponse, AppError> {
    let (account, nursery) = require_nursery(&state, &headers).await?;
    let product =
        products::create(&state.store, &state.files, &account.id, &nursery.id, new).await?;
    Ok((StatusCode::CREATED, Json(json!({"status":"ok","product": product}))))
}

pub async fn nursery_edit_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
    Json(edit): Json<products::EditProduct>,
) -> Result<impl IntoResponse, AppError> {
    let (_, nursery) = require_nursery(&state, &headers).await?;
    let current = products::get(&state.store, &product_id).await?;
    if current.nurseryid != nursery.id {
        return Err(AppError::forbidden("not_your_product", "product belongs to another nursery"));
    }
    let product = products::edit(&state.store, &state.files, &product_id, edit).await?;
    Ok(Json(json!({"status":"ok","product": product})))
}

pub async fn nursery_delete_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (_, nursery) = require_nursery(&state, &headers).await?;
    let current = products::get(&state.store, &product_id).await?;
    if current.nurseryid != nursery.id {
        return Err(AppError::forbidden("not_your_product", "product belongs to another nursery"));
    }
    products::remove(&state.store, &product_id).await?;
    Ok(Json(json!({"status":"ok"})))
}

pub async fn nursery_setup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<nurseries::NurseryForm>,
) -> Result<impl IntoResponse, AppError> {
    let (account, _) = require_role(&state, &headers, Role::NurseryAdmin).await?;
    // Second submit updates in place instead of failing the form
    let nursery = match nurseries::for_owner(&state.store, &account.id).await? {
        Some(existing) => nurseries::update(&state.store, &existing.id, form).await?,
        None => nurseries::create(&state.store, &account.id, form).await?,
    };
    Ok(Json(json!({"status":"ok","nursery": nursery})))
}

pub async fn nursery_analytics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let (_, nursery) = require_nursery(&state, &headers).await?;
    let stats = stats::nursery(&state.store, &nursery.id).await?;
    let orders = orders::for_nursery(&state.store, &nursery.id).await?;
    Ok(Json(json!({"status":"ok","stats": stats, "orders": orders.documents})))
}

// ---------------------------------------------------------------------------
// super admin
// ---------------------------------------------------------------------------

pub async fn superadmin_home(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    require_role(&state, &headers, Role::SuperAdmin).await?;
    let stats = stats::marketplace(&state.store).await?;
    Ok(Json(json!({"status":"ok","stats": stats})))
}

pub async fn superadmin_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    require_role(&state, &headers, Role::SuperAdmin).await?;
    let users = profiles::all(&state.store).await?;
    Ok(Json(json!({"status":"ok","users": users.documents, "total": users.total})))
}

#[derive(Debug, Deserialize)]
pub struct RolePayload {
    pub role: String,
}

pub async fn superadmin_set_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(profile_id): Path<String>,
    Json(payload): Json<RolePayload>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&state, &headers, Role::SuperAdmin).await?;
    let Some(role) = Role::parse(&payload.role) else {
        return Err(AppError::user("bad_role", "unknown role label"));
    };
    let profile = profiles::set_role(&state.store, &profile_id, role).await?;
    Ok(Json(json!({"status":"ok","profile": profile})))
}

pub async fn superadmin_delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(profile_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&state, &headers, Role::SuperAdmin).await?;
    profiles::remove(&state.store, &profile_id).await?;
    Ok(Json(json!({"status":"ok"})))
}

pub async fn superadmin_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    require_role(&state, &headers, Role::SuperAdmin).await?;
    let orders = orders::all(&state.store).await?;
    Ok(Json(json!({"status":"ok","orders": orders.documents, "total": orders.total})))
}

pub async fn superadmin_inventory(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    require_role(&state, &headers, Role::SuperAdmin).await?;
    let inventory = products::list_all(&state.store).await?;
    Ok(Json(json!({"status":"ok","products": inventory})))
}

pub async fn superadmin_commission(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    require_role(&state, &headers, Role::SuperAdmin).await?;
    let rate = settings::commission_rate(&state.store, &state.commission).await;
    Ok(Json(json!({"status":"ok","rate": rate})))
}

#[derive(Debug, Deserialize)]
pub struct CommissionPayload {
    pub rate: f64,
}

pub async fn superadmin_set_commission(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CommissionPayload>,
) -> Result<impl IntoResponse, AppError> {
    require_role(&state, &headers, Role::SuperAdmin).await?;
    let rate = settings::set_commission_rate(&state.store, &state.commission, payload.rate).await?;
    Ok(Json(json!({"status":"ok","rate": rate})))
}

pub async fn superadmin_analytics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    require_role(&state, &headers, Role::SuperAdmin).await?;
    let stats = stats::marketplace(&state.store).await?;
    let orders = orders::all(&state.store).await?;
    Ok(Json(json!({"status":"ok","stats": stats, "orders": orders.documents})))
}
