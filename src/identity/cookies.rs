//! One canonical cookie scheme, used everywhere cookies are read or written.
//! Three cookies are set at login and cleared at logout:
//! - `app_session`: opaque provider session id, HttpOnly; presence means
//!   authenticated as far as the routing gate is concerned.
//! - `role`: canonical lowercase role label; readable by the client UI, which
//!   is why it is not HttpOnly.
//! - `isLoggedIn`: legacy compatibility flag for the storefront.

use axum::http::{HeaderMap, HeaderValue};

use crate::access::Role;

pub const SESSION_COOKIE: &str = "app_session";
pub const ROLE_COOKIE: &str = "role";
pub const LOGGED_IN_COOKIE: &str = "isLoggedIn";

const MAX_AGE_SECS: i64 = 7 * 24 * 3600;

pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie = headers.get("cookie").or_else(|| headers.get("Cookie"))?;
    let s = cookie.to_str().ok()?;
    for part in s.split(';') {
        let p = part.trim();
        if let Some(eq) = p.find('=') {
            let (k, v) = p.split_at(eq);
            if k == name {
                return Some(v[1..].to_string());
            }
        }
    }
    None
}

fn set_cookie(name: &str, value: &str, http_only: bool) -> HeaderValue {
    let flags = if http_only { "; HttpOnly" } else { "" };
    HeaderValue::from_str(&format!(
        "{}={}; Max-Age={}; Secure; SameSite=Lax; Path=/{}",
        name, value, MAX_AGE_SECS, flags
    ))
    .unwrap()
}

fn clear_cookie(name: &str) -> HeaderValue {
    HeaderValue::from_str(&format!(
        "{}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0; Secure; SameSite=Lax; Path=/",
        name
    ))
    .unwrap()
}

/// Set-Cookie values for a fresh login.
pub fn login_cookies(session_id: &str, role: Role) -> Vec<HeaderValue> {
    vec![
        set_cookie(SESSION_COOKIE, session_id, true),
        set_cookie(ROLE_COOKIE, role.as_str(), false),
        set_cookie(LOGGED_IN_COOKIE, "1", false),
    ]
}

/// Set-Cookie values clearing the whole scheme at logout.
pub fn logout_cookies() -> Vec<HeaderValue> {
    vec![
        clear_cookie(SESSION_COOKIE),
        clear_cookie(ROLE_COOKIE),
        clear_cookie(LOGGED_IN_COOKIE),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert("cookie", HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn parses_named_cookie_among_several() {
        let h = headers_with_cookie("isLoggedIn=1; app_session=abc123; role=nurseryadmin");
        assert_eq!(parse_cookie(&h, SESSION_COOKIE).as_deref(), Some("abc123"));
        assert_eq!(parse_cookie(&h, ROLE_COOKIE).as_deref(), Some("nurseryadmin"));
        assert_eq!(parse_cookie(&h, "missing"), None);
    }

    #[test]
    fn absent_header_reads_as_none() {
        assert_eq!(parse_cookie(&HeaderMap::new(), SESSION_COOKIE), None);
    }

    #[test]
    fn login_cookies_carry_expected_attributes() {
        let set = login_cookies("sess-1", Role::SuperAdmin);
        let session = set[0].to_str().unwrap();
        assert!(session.starts_with("app_session=sess-1;"));
        assert!(session.contains("HttpOnly"));
        assert!(session.contains("SameSite=Lax"));
        let role = set[1].to_str().unwrap();
        assert!(role.starts_with("role=superadmin;"));
        assert!(!role.contains("HttpOnly"));
    }

    #[test]
    fn logout_cookies_expire_everything() {
        for hv in logout_cookies() {
            assert!(hv.to_str().unwrap().contains("Max-Age=0"));
        }
    }
}
