//! Route access control for the marketplace.
//! A request-level gate runs before every page route: it inspects the
//! session-indicator and role cookies and decides to pass the request
//! through, redirect to the login page, or redirect to the role's home.
//! Keep the public surface thin and split implementation across sub-modules.

mod decision;
mod middleware;
mod role;

pub use decision::{evaluate, Decision, LOGIN_PATH};
pub use middleware::gate;
pub use role::Role;
