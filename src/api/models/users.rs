//! API request/response models for users.

use crate::db::models::users::UserDBResponse;
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Application-wide privilege level, independent of any group.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GlobalRole {
    #[serde(rename = "ApplicationAdmin")]
    ApplicationAdmin,
    #[serde(rename = "user")]
    User,
}

impl GlobalRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalRole::ApplicationAdmin => "ApplicationAdmin",
            GlobalRole::User => "user",
        }
    }
}

impl fmt::Display for GlobalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GlobalRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ApplicationAdmin" => Ok(GlobalRole::ApplicationAdmin),
            "user" => Ok(GlobalRole::User),
            other => Err(anyhow::anyhow!("unknown global role: {other}")),
        }
    }
}

/// Request body for updating the caller's own profile. All fields are
/// optional; changing the password requires the current one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Full user details returned by the API. Never carries the secret hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub nickname: String,
    pub global_role: GlobalRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The identity attached to a request by the authorization middleware:
/// exactly the claims embedded in the bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub nickname: String,
    pub global_role: GlobalRole,
}

impl CurrentUser {
    pub fn is_application_admin(&self) -> bool {
        self.global_role == GlobalRole::ApplicationAdmin
    }
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            email: db.email,
            nickname: db.nickname,
            global_role: db.global_role,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<UserDBResponse> for CurrentUser {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            nickname: db.nickname,
            global_role: db.global_role,
        }
    }
}
