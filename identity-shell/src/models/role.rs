//! Dashboard roles and the routing contract derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Landing screen where a visitor picks a role card.
pub const ROLE_SELECT_PATH: &str = "/";

/// The four personas the dashboard serves. Every screen past the landing
/// page is scoped to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Sme,
    Investor,
    Client,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Sme, Role::Investor, Role::Client, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Sme => "sme",
            Role::Investor => "investor",
            Role::Client => "client",
            Role::Admin => "admin",
        }
    }

    /// Dashboard the role lands on after sign-in.
    pub fn dashboard_path(&self) -> String {
        format!("/dashboard/{}", self.as_str())
    }

    /// Role-scoped credential capture page.
    pub fn login_path(&self) -> String {
        format!("/login/{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sme" => Ok(Role::Sme),
            "investor" => Ok(Role::Investor),
            "client" => Ok(Role::Client),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_paths_follow_routing_contract() {
        assert_eq!(Role::Sme.dashboard_path(), "/dashboard/sme");
        assert_eq!(Role::Investor.login_path(), "/login/investor");
        assert_eq!(ROLE_SELECT_PATH, "/");
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("CLIENT".parse::<Role>(), Ok(Role::Client));
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Sme).unwrap();
        assert_eq!(json, "\"sme\"");
    }
}
