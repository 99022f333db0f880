use serde::{Deserialize, Serialize};

/// Closed role classification governing which route prefixes a request may
/// reach. The wire form is the canonical lowercase label; parsing is
/// case-insensitive so historical cookie spellings like "User" still resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    NurseryAdmin,
    SuperAdmin,
}

impl Role {
    /// Single shared classification function: unrecognized labels map to None
    /// ("not yet determined"), never to an error.
    pub fn parse(label: &str) -> Option<Role> {
        match label.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "nurseryadmin" => Some(Role::NurseryAdmin),
            "superadmin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::NurseryAdmin => "nurseryadmin",
            Role::SuperAdmin => "superadmin",
        }
    }

    /// Landing page for a role after login or when bounced off a foreign prefix.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "/superadmin",
            Role::NurseryAdmin => "/nurseryadmin",
            Role::User => "/user/dashboard",
        }
    }
}

/// Home for an optional role: an undetermined role lands on the user dashboard.
pub(crate) fn home_for(role: Option<Role>) -> &'static str {
    role.map(|r| r.home_path()).unwrap_or("/user/dashboard")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Role::parse("User"), Some(Role::User));
        assert_eq!(Role::parse("NURSERYADMIN"), Some(Role::NurseryAdmin));
        assert_eq!(Role::parse(" superadmin "), Some(Role::SuperAdmin));
    }

    #[test]
    fn parse_rejects_unknown_labels() {
        // "admin" was an abandoned draft spelling, not a recognized role
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::parse(""), None);
        assert_eq!(Role::parse("root"), None);
    }

    #[test]
    fn round_trips_through_canonical_label() {
        for role in [Role::User, Role::NurseryAdmin, Role::SuperAdmin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn home_paths() {
        assert_eq!(Role::SuperAdmin.home_path(), "/superadmin");
        assert_eq!(Role::NurseryAdmin.home_path(), "/nurseryadmin");
        assert_eq!(Role::User.home_path(), "/user/dashboard");
        assert_eq!(home_for(None), "/user/dashboard");
    }
}
