//!
//! nurserymart HTTP server
//! -----------------------
//! This module defines the axum-based HTTP surface of the marketplace.
//!
//! Responsibilities:
//! - Construction of the shared application state (BaaS clients, payment
//!   gateway, commission cache) from configuration.
//! - Login/signup/logout endpoints backed by the hosted identity provider.
//! - The route table: public storefront, auth entry points, role-gated
//!   dashboard pages, and gate-bypassing API routes.
//! - The access-control gate layered over every page route, fallback
//!   included.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::access::Role;
use crate::baas::{DocStore, FileStore};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::identity::{cookies, Account, AuthProvider, BaasAuthProvider};
use crate::marketplace::profiles;
use crate::marketplace::settings::CommissionCache;
use crate::payments::PaymentGateway;

pub mod api;
pub mod pages;

/// Shared server state injected into all handlers. All collaborator clients
/// are constructed here once and cloned into handlers; nothing lives in
/// module globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: DocStore,
    pub files: FileStore,
    pub auth: Arc<dyn AuthProvider>,
    pub gateway: PaymentGateway,
    pub commission: CommissionCache,
}

impl AppState {
    pub fn new(config: Config, http: reqwest::Client) -> Self {
        let store = DocStore::new(http.clone(), &config);
        let files = FileStore::new(http.clone(), &config);
        let auth = Arc::new(BaasAuthProvider::new(
            http.clone(),
            &config.baas_endpoint,
            &config.baas_project_id,
            &config.baas_api_key,
        ));
        let gateway = PaymentGateway::new(http, &config.stripe_secret_key);
        Self {
            config: Arc::new(config),
            store,
            files,
            auth,
            gateway,
            commission: CommissionCache::new(),
        }
    }
}

/// Start the marketplace server with configuration taken from the environment.
pub async fn run() -> anyhow::Result<()> {
    run_with_config(Config::load()).await
}

pub async fn run_with_config(config: Config) -> anyhow::Result<()> {
    let http_port = config.http_port;
    let http = reqwest::Client::builder().build()?;
    let state = AppState::new(config, http);
    let app = build_router(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", http_port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Mount all routes and layer the access gate over the whole router
/// (fallback included) so every page path is classified.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "nurserymart ok" }))
        .route("/login", post(login))
        .route("/signup", post(signup))
        .route("/logout", post(logout))
        // public storefront
        .route("/shop", get(pages::shop))
        .route("/shop/{id}", get(pages::shop_product))
        .route("/contact", post(pages::contact_submit))
        // customer dashboard
        .route("/user/dashboard", get(pages::user_dashboard))
        .route("/user/orders", get(pages::user_orders))
        .route("/user/orders/{id}/items", get(pages::user_order_items))
        .route(
            "/user/profile",
            get(pages::user_profile).patch(pages::user_profile_update),
        )
        .route(
            "/user/cart",
            get(pages::cart_list).post(pages::cart_add).delete(pages::cart_clear),
        )
        .route(
            "/user/cart/{id}",
            axum::routing::patch(pages::cart_set_quantity).delete(pages::cart_remove),
        )
        // nursery admin
        .route("/nurseryadmin", get(pages::nursery_home))
        .route("/nurseryadmin/inventory", get(pages::nursery_inventory))
        .route("/nurseryadmin/orders", get(pages::nursery_orders))
        .route(
            "/nurseryadmin/orders/{id}/status",
            axum::routing::patch(pages::nursery_order_status),
        )
        .route("/nurseryadmin/addproduct", post(pages::nursery_add_product))
        .route(
            "/nurseryadmin/products/{id}",
            axum::routing::patch(pages::nursery_edit_product).delete(pages::nursery_delete_product),
        )
        .route("/nurseryadmin/setup-nursery", post(pages::nursery_setup))
        .route("/nurseryadmin/analytics", get(pages::nursery_analytics))
        // super admin
        .route("/superadmin", get(pages::superadmin_home))
        .route("/superadmin/users", get(pages::superadmin_users))
        .route(
            "/superadmin/users/{id}/role",
            axum::routing::patch(pages::superadmin_set_role),
        )
        .route(
            "/superadmin/users/{id}",
            axum::routing::delete(pages::superadmin_delete_user),
        )
        .route("/superadmin/orders", get(pages::superadmin_orders))
        .route("/superadmin/inventory", get(pages::superadmin_inventory))
        .route(
            "/superadmin/commission",
            get(pages::superadmin_commission).put(pages::superadmin_set_commission),
        )
        .route("/superadmin/analytics", get(pages::superadmin_analytics))
        // API routes: reached directly by the storefront and the payment
        // gateway; the access gate bypasses everything under /api
        .route("/api/create-checkout-session", post(api::create_checkout_session))
        .route("/api/stripe-webhook", post(api::stripe_webhook))
        .route("/api/orders", post(api::create_order))
        .fallback(not_found)
        .layer(axum::middleware::from_fn(crate::access::gate))
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"status":"error","code":"not_found","message":"no such page"})),
    )
}

/// Resolve the current account from the session cookie. This is the
/// data-layer check: it asks the identity provider, it does not trust the
/// cookie the way the routing gate does.
pub(crate) async fn require_account(state: &AppState, headers: &HeaderMap) -> AppResult<Account> {
    let sid = cookies::parse_cookie(headers, cookies::SESSION_COOKIE)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::auth("no_session", "not signed in"))?;
    state
        .auth
        .current_account(&sid)
        .await?
        .ok_or_else(|| AppError::auth("invalid_session", "session is no longer valid"))
}

/// Resolve the account and check its stored role against the requirement.
/// A super-admin satisfies the nursery-admin requirement.
pub(crate) async fn require_role(
    state: &AppState,
    headers: &HeaderMap,
    wanted: Role,
) -> AppResult<(Account, Role)> {
    let account = require_account(state, headers).await?;
    let profile = profiles::by_email(&state.store, &account.email).await?;
    let role = profile.and_then(|p| p.role()).unwrap_or(Role::User);
    let allowed = match wanted {
        Role::User => true,
        Role::NurseryAdmin => matches!(role, Role::NurseryAdmin | Role::SuperAdmin),
        Role::SuperAdmin => role == Role::SuperAdmin,
    };
    if !allowed {
        return Err(AppError::forbidden("wrong_role", "not allowed for this role"));
    }
    Ok((account, role))
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct SignupPayload {
    name: String,
    email: String,
    #[serde(default)]
    phone: String,
    password: String,
    #[serde(default)]
    role: Option<String>,
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    let session = state
        .auth
        .create_session(&payload.email, &payload.password)
        .await
        .map_err(|_| AppError::auth("invalid_credentials", "invalid email or password"))?;

    // A failed role lookup falls back to the default role; login itself
    // still succeeds.
    let role = match profiles::by_email(&state.store, &payload.email).await {
        Ok(Some(profile)) => profile.role().unwrap_or(Role::User),
        Ok(None) => Role::User,
        Err(e) => {
            error!("role lookup failed during login: {e}");
            Role::User
        }
    };

    let mut headers = HeaderMap::new();
    for hv in cookies::login_cookies(&session.id, role) {
        headers.append("Set-Cookie", hv);
    }
    info!(user = %payload.email, role = role.as_str(), "login");
    Ok((
        StatusCode::OK,
        headers,
        Json(json!({"status":"ok","role": role.as_str(), "home": role.home_path()})),
    ))
}

async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupPayload>,
) -> Result<impl IntoResponse, AppError> {
    let role = payload
        .role
        .as_deref()
        .and_then(Role::parse)
        .unwrap_or(Role::User);
    let account = state
        .auth
        .create_account(&payload.name, &payload.email, &payload.password)
        .await
        .map_err(|e| AppError::conflict("signup_failed", e.to_string()))?;
    profiles::create(&state.store, &payload.name, &payload.email, &payload.phone, role).await?;
    // No cookies at signup; the login flow owns session issuance
    Ok((
        StatusCode::CREATED,
        Json(json!({"status":"ok","account": account.id})),
    ))
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(sid) = cookies::parse_cookie(&headers, cookies::SESSION_COOKIE) {
        // Best effort: cookies are cleared even when the provider call fails
        if let Err(e) = state.auth.delete_session(&sid).await {
            error!("logout: session delete failed: {e}");
        }
    }
    let mut h = HeaderMap::new();
    for hv in cookies::logout_cookies() {
        h.append("Set-Cookie", hv);
    }
    (StatusCode::OK, h, Json(json!({"status":"ok"})))
}
