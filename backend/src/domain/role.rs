//! Two-valued permission level attached to every user account.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Permission level controlling access to privileged operations.
///
/// Only the two explicit role-flip operations change a user's role; there is
/// no other transition path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Default level granted on registration.
    Regular,
    /// Grants access to admin-gated operations.
    Admin,
}

impl Role {
    /// Stable lowercase name used in claims and database rows.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Admin => "admin",
        }
    }

    /// Whether this role passes admin-gated checks.
    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored or claimed role name is not one of the two values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(Self::Regular),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Role::Regular, "regular")]
    #[case(Role::Admin, "admin")]
    fn round_trips_through_str(#[case] role: Role, #[case] name: &str) {
        assert_eq!(role.as_str(), name);
        assert_eq!(name.parse::<Role>().expect("parse role"), role);
    }

    #[rstest]
    fn rejects_unknown_names() {
        let err = "owner".parse::<Role>().expect_err("should fail");
        assert_eq!(err, UnknownRole("owner".into()));
    }

    #[rstest]
    fn serialises_lowercase() {
        let json = serde_json::to_string(&Role::Admin).expect("serialise");
        assert_eq!(json, "\"admin\"");
    }
}
