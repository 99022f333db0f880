//! Access-gate properties: the pure decision function is exercised across the
//! whole route surface for every session/role combination.

use nurserymart::access::{evaluate, Decision, Role, LOGIN_PATH};

const GATED_PATHS: &[&str] = &[
    "/superadmin",
    "/superadmin/users",
    "/superadmin/commission",
    "/nurseryadmin",
    "/nurseryadmin/orders",
    "/nurseryadmin/inventory",
    "/user",
    "/user/dashboard",
    "/user/orders",
    "/dashboard",
    "/dashboard/anything",
];

const PUBLIC_PATHS: &[&str] = &["/", "/shop", "/shop/42", "/about", "/contact", "/plants/ferns"];

const ROLES: &[Option<Role>] = &[
    None,
    Some(Role::User),
    Some(Role::NurseryAdmin),
    Some(Role::SuperAdmin),
];

#[test]
fn public_paths_always_pass() {
    for path in PUBLIC_PATHS {
        for has_session in [false, true] {
            for role in ROLES {
                assert_eq!(
                    evaluate(path, has_session, *role),
                    Decision::Pass,
                    "public path {path} must pass (session={has_session}, role={role:?})"
                );
            }
        }
    }
}

#[test]
fn gated_paths_without_session_redirect_to_login() {
    for path in GATED_PATHS {
        for role in ROLES {
            assert_eq!(
                evaluate(path, false, *role),
                Decision::Redirect(LOGIN_PATH),
                "unauthenticated {path} must bounce to login"
            );
        }
    }
}

#[test]
fn superadmin_passes_every_gated_prefix() {
    for path in GATED_PATHS {
        assert_eq!(
            evaluate(path, true, Some(Role::SuperAdmin)),
            Decision::Pass,
            "superadmin must pass {path}"
        );
    }
}

#[test]
fn nurseryadmin_owns_its_prefix_and_bounces_off_superadmin() {
    assert_eq!(evaluate("/nurseryadmin", true, Some(Role::NurseryAdmin)), Decision::Pass);
    assert_eq!(
        evaluate("/nurseryadmin/orders", true, Some(Role::NurseryAdmin)),
        Decision::Pass
    );
    assert_eq!(
        evaluate("/superadmin", true, Some(Role::NurseryAdmin)),
        Decision::Redirect("/nurseryadmin")
    );
    assert_eq!(
        evaluate("/superadmin/users", true, Some(Role::NurseryAdmin)),
        Decision::Redirect("/nurseryadmin")
    );
}

#[test]
fn plain_user_bounces_off_both_admin_prefixes() {
    for path in ["/superadmin", "/superadmin/orders", "/nurseryadmin", "/nurseryadmin/inventory"] {
        assert_eq!(
            evaluate(path, true, Some(Role::User)),
            Decision::Redirect("/user/dashboard"),
            "user must bounce off {path}"
        );
    }
    assert_eq!(evaluate("/user/dashboard", true, Some(Role::User)), Decision::Pass);
    assert_eq!(evaluate("/dashboard", true, Some(Role::User)), Decision::Pass);
}

#[test]
fn authenticated_visitors_never_see_auth_pages() {
    for path in ["/login", "/signup"] {
        assert_eq!(
            evaluate(path, true, Some(Role::SuperAdmin)),
            Decision::Redirect("/superadmin")
        );
        assert_eq!(
            evaluate(path, true, Some(Role::NurseryAdmin)),
            Decision::Redirect("/nurseryadmin")
        );
        assert_eq!(
            evaluate(path, true, Some(Role::User)),
            Decision::Redirect("/user/dashboard")
        );
        // undetermined role still lands somewhere, never on the auth page
        assert_eq!(evaluate(path, true, None), Decision::Redirect("/user/dashboard"));
    }
}

#[test]
fn auth_pages_pass_without_a_session() {
    assert_eq!(evaluate("/login", false, None), Decision::Pass);
    assert_eq!(evaluate("/signup", false, None), Decision::Pass);
}

#[test]
fn evaluation_is_idempotent() {
    for path in GATED_PATHS.iter().chain(PUBLIC_PATHS).chain(&["/login", "/signup"]) {
        for has_session in [false, true] {
            for role in ROLES {
                let first = evaluate(path, has_session, *role);
                for _ in 0..3 {
                    assert_eq!(evaluate(path, has_session, *role), first);
                }
            }
        }
    }
}

#[test]
fn representative_scenarios() {
    assert_eq!(
        evaluate("/nurseryadmin/orders", false, None),
        Decision::Redirect(LOGIN_PATH)
    );
    assert_eq!(
        evaluate("/superadmin", true, Some(Role::NurseryAdmin)),
        Decision::Redirect("/nurseryadmin")
    );
    assert_eq!(evaluate("/shop/42", false, None), Decision::Pass);
    assert_eq!(
        evaluate("/login", true, Some(Role::SuperAdmin)),
        Decision::Redirect("/superadmin")
    );
    assert_eq!(evaluate("/user/dashboard", true, Some(Role::User)), Decision::Pass);
}

#[test]
fn role_labels_from_cookies_parse_case_insensitively() {
    // The gate sees whatever historical spelling the cookie carries
    assert_eq!(
        evaluate("/superadmin", true, Role::parse("SuperAdmin")),
        Decision::Pass
    );
    assert_eq!(
        evaluate("/nurseryadmin", true, Role::parse("NURSERYADMIN")),
        Decision::Pass
    );
    // The abandoned "admin" draft label is unrecognized: back to login
    assert_eq!(
        evaluate("/nurseryadmin", true, Role::parse("admin")),
        Decision::Redirect(LOGIN_PATH)
    );
}

#[test]
fn bypass_paths_are_never_evaluated() {
    for path in [
        "/api/create-checkout-session",
        "/api/stripe-webhook",
        "/api/orders",
        "/_internal/metrics",
        "/favicon.ico",
        "/logo.svg",
        "/banner.jpeg",
    ] {
        for has_session in [false, true] {
            for role in ROLES {
                assert_eq!(evaluate(path, has_session, *role), Decision::Pass);
            }
        }
    }
}
