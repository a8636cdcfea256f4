//! Role hierarchy.
//!
//! Three tiers, totally ordered: `SUPER_ADMIN > ADMIN > STAFF`.
//!
//! Two predicates:
//! - [`Role::has_permission_level`]: may a holder of `self` access an operation requiring `required`
//! - [`Role::can_assign`]: may a holder of `self` set `candidate` on a subject
//!
//! An ADMIN passes an ADMIN-level access check but may only hand out STAFF.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    Admin,
    Staff,
}

/// Returned when a string does not name one of [`Role::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid role '{given}'; valid roles are: {}", Role::names().join(", "))]
pub struct UnknownRole {
    pub given: String,
}

impl Role {
    /// Highest privilege first.
    pub const ALL: [Role; 3] = [Role::SuperAdmin, Role::Admin, Role::Staff];

    /// Lowest privilege; what every subject without a usable role record resolves to.
    pub const DEFAULT: Role = Role::Staff;

    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::Staff => "STAFF",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|r| r.as_str()).collect()
    }

    fn rank(self) -> u8 {
        match self {
            Role::SuperAdmin => 2,
            Role::Admin => 1,
            Role::Staff => 0,
        }
    }

    /// Access check against an operation's required role.
    ///
    /// - SUPER_ADMIN: anything
    /// - ADMIN: anything but SUPER_ADMIN
    /// - STAFF: STAFF only
    pub fn has_permission_level(self, required: Role) -> bool {
        self.rank() >= required.rank()
    }

    /// Assignment check: may `self` set `candidate` as a subject's role.
    ///
    /// Only SUPER_ADMIN grants SUPER_ADMIN, and ADMIN grants STAFF only. Nothing else is
    /// restricted here; who may reach a role-changing operation at all is decided by its
    /// route requirement.
    pub fn can_assign(self, candidate: Role) -> bool {
        let grants_super_admin = candidate == Role::SuperAdmin && self != Role::SuperAdmin;
        let admin_grants_above_staff = self == Role::Admin && candidate != Role::Staff;
        !(grants_super_admin || admin_grants_above_staff)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    // Stored values are matched case-insensitively ("admin" == "ADMIN").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == normalized)
            .ok_or_else(|| UnknownRole {
                given: s.to_string(),
            })
    }
}
