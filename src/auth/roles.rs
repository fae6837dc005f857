// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles for authorization.
///
/// - `User` - Regular account; may mutate only the posts it authored
/// - `Admin` - Administrative account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account (default for new registrations)
    #[default]
    User,
    /// Administrative account
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit allow-list of roles for a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowedRoles(pub &'static [Role]);

impl AllowedRoles {
    /// Only administrators.
    pub const ADMIN: AllowedRoles = AllowedRoles(&[Role::Admin]);

    /// Check whether a role is on the list.
    pub fn permits(&self, role: Role) -> bool {
        self.0.contains(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_role_is_user() {
        assert_eq!(Role::default(), Role::User);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
        assert_eq!(serde_json::from_str::<Role>(r#""user""#).unwrap(), Role::User);
    }

    #[test]
    fn allow_list_membership() {
        assert!(AllowedRoles::ADMIN.permits(Role::Admin));
        assert!(!AllowedRoles::ADMIN.permits(Role::User));
        assert!(!AllowedRoles(&[]).permits(Role::Admin));
    }
}
