//! User domain entity and related types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{ROLE_DONOR, ROLE_RECEIVER};
use crate::error::DomainError;

/// User roles. Every role-gated operation matches on this exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Donor,
    Receiver,
}

impl Role {
    /// Storage representation of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Donor => ROLE_DONOR,
            Role::Receiver => ROLE_RECEIVER,
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_DONOR => Ok(Role::Donor),
            ROLE_RECEIVER => Ok(Role::Receiver),
            other => Err(DomainError::validation(format!("Unknown role: {}", other))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    /// Receivers usually register on behalf of an organization
    pub organization_name: Option<String>,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Identity used for authorization checks
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.id,
            role: self.role,
        }
    }
}

/// The resolved identity behind a request: who is acting, and in which role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i32,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: i32, role: Role) -> Self {
        Self { user_id, role }
    }
}

/// Registration data, with the password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub organization_name: Option<String>,
    pub location: String,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserResponse {
    /// Unique user identifier
    pub id: i32,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Donor or receiver
    pub role: Role,
    /// Organization the receiver represents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    /// Free-text location
    pub location: String,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            organization_name: user.organization_name,
            location: user.location,
            created_at: user.created_at,
        }
    }
}
