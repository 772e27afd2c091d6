//! User, admin and caller identity types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Member role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
    Headmaster,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
            Role::Headmaster => "headmaster",
        }
    }

    /// Staff may read circulation reports
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Headmaster)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "student" => Ok(Role::Student),
            "headmaster" => Ok(Role::Headmaster),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// `users` document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Sequential member id, e.g. `"2415001"`
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    /// Argon2 PHC string for members registered by this server
    #[serde(default)]
    pub password: String,
    pub role: Role,
}

/// `admin` document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    /// Referenced by `Student.adminId`
    pub id: String,
    pub user_id: String,
}

/// Identity of the caller as asserted by the authenticating gateway.
///
/// Already verified upstream; passed explicitly into every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CallerClaims {
    pub id: String,
    pub role: Role,
}

impl CallerClaims {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}
