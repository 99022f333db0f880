//! The cookie-reading, redirect-issuing shell around the decision function.
//! Runs once per request as an axum middleware layer over the whole router,
//! including the fallback, so every page path gets classified.

use std::panic::{catch_unwind, AssertUnwindSafe};

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::{debug, error};

use crate::identity::cookies;

use super::decision::{evaluate, Decision};
use super::role::Role;

/// Request-level gate: pass through or redirect, nothing else.
///
/// A panic anywhere in classification is contained and treated as Pass; the
/// gate must never take a page down.
pub async fn gate(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let headers = req.headers().clone();

    let decision = catch_unwind(AssertUnwindSafe(|| {
        // A missing or garbled cookie value reads as "absent"
        let has_session = cookies::parse_cookie(&headers, cookies::SESSION_COOKIE)
            .map(|v| !v.is_empty())
            .unwrap_or(false);
        let role = cookies::parse_cookie(&headers, cookies::ROLE_COOKIE)
            .and_then(|v| Role::parse(&v));
        evaluate(&path, has_session, role)
    }))
    .unwrap_or_else(|_| {
        error!(target: "panic", %path, "access gate panic, failing open");
        Decision::Pass
    });

    match decision {
        Decision::Pass => next.run(req).await,
        Decision::Redirect(target) => {
            debug!(%path, target, "access gate redirect");
            Redirect::temporary(target).into_response()
        }
    }
}
