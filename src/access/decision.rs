//! The access decision procedure: a pure, total function from
//! (path, session presence, role) to pass-or-redirect. Classification is
//! evaluated in priority order (first match wins): bypass paths, auth pages,
//! role-gated prefixes, then everything else as public storefront.
//!
//! The function is deliberately fail-open: anything it cannot classify passes
//! through, so a defect here degrades to an over-permissive window instead of
//! taking the site offline. The data-access layer performs its own
//! session/role checks independently of this gate.

use once_cell::sync::Lazy;
use regex::Regex;

use super::role::{home_for, Role};

pub const LOGIN_PATH: &str = "/login";

/// Outcome of evaluating one request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Pass,
    Redirect(&'static str),
}

/// Static assets are never evaluated. Extension set mirrors the storefront's
/// public asset types.
static ASSET_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(?:svg|png|jpe?g|gif|webp|ico)$").unwrap());

/// Which role owns a gated prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    SuperAdminOnly,
    NurseryAdminOnly,
    AnyAuthenticated,
}

/// Segment-aware prefix test: "/user/orders" is under "/user", "/userfoo" is not.
fn under(path: &str, prefix: &str) -> bool {
    path == prefix
        || (path.starts_with(prefix) && path.as_bytes().get(prefix.len()) == Some(&b'/'))
}

/// API routes, framework-internal paths and static assets bypass the gate.
fn is_bypass(path: &str) -> bool {
    under(path, "/api") || path.starts_with("/_") || ASSET_PATH.is_match(path)
}

fn gate_for(path: &str) -> Option<Gate> {
    if under(path, "/superadmin") {
        Some(Gate::SuperAdminOnly)
    } else if under(path, "/nurseryadmin") {
        Some(Gate::NurseryAdminOnly)
    } else if under(path, "/user") || under(path, "/dashboard") {
        Some(Gate::AnyAuthenticated)
    } else {
        None
    }
}

/// Decide whether a request passes through or is redirected.
///
/// Pure and total: every (path, has_session, role) triple maps to exactly one
/// decision, the same one on every evaluation.
pub fn evaluate(path: &str, has_session: bool, role: Option<Role>) -> Decision {
    // 1) bypass paths are never evaluated
    if is_bypass(path) {
        return Decision::Pass;
    }

    // 2) auth pages: an already-authenticated visitor is sent home
    if under(path, "/login") || under(path, "/signup") {
        return if has_session {
            Decision::Redirect(home_for(role))
        } else {
            Decision::Pass
        };
    }

    // 3) role-gated prefixes
    let Some(gate) = gate_for(path) else {
        // 4) everything else is public storefront (explicit fail-open arm)
        return Decision::Pass;
    };

    if !has_session {
        return Decision::Redirect(LOGIN_PATH);
    }
    let Some(role) = role else {
        // session without a recognizable role: back through login
        return Decision::Redirect(LOGIN_PATH);
    };

    match gate {
        Gate::AnyAuthenticated => Decision::Pass,
        Gate::NurseryAdminOnly => match role {
            Role::NurseryAdmin | Role::SuperAdmin => Decision::Pass,
            Role::User => Decision::Redirect(role.home_path()),
        },
        Gate::SuperAdminOnly => match role {
            Role::SuperAdmin => Decision::Pass,
            Role::NurseryAdmin | Role::User => Decision::Redirect(role.home_path()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bypass_paths_never_redirect() {
        assert_eq!(evaluate("/api/stripe-webhook", false, None), Decision::Pass);
        assert_eq!(evaluate("/api/create-checkout-session", true, None), Decision::Pass);
        assert_eq!(evaluate("/_internal/health", false, None), Decision::Pass);
        assert_eq!(evaluate("/favicon.ico", false, None), Decision::Pass);
        assert_eq!(evaluate("/images/monstera.WEBP", true, Some(Role::User)), Decision::Pass);
    }

    #[test]
    fn prefix_matching_is_segment_aware() {
        assert_eq!(evaluate("/userfoo", false, None), Decision::Pass);
        assert_eq!(evaluate("/superadministrivia", false, None), Decision::Pass);
        assert_eq!(evaluate("/user", false, None), Decision::Redirect(LOGIN_PATH));
        assert_eq!(evaluate("/user/orders", false, None), Decision::Redirect(LOGIN_PATH));
    }

    #[test]
    fn null_role_with_session_on_gated_prefix_goes_to_login() {
        assert_eq!(evaluate("/superadmin", true, None), Decision::Redirect(LOGIN_PATH));
        assert_eq!(evaluate("/nurseryadmin/orders", true, None), Decision::Redirect(LOGIN_PATH));
        assert_eq!(evaluate("/user/dashboard", true, None), Decision::Redirect(LOGIN_PATH));
    }
}
