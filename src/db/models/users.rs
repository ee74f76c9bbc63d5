//! Store models for users.

use crate::api::models::users::GlobalRole;
use crate::types::UserId;
use chrono::{DateTime, Utc};

/// Store request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub name: String,
    pub email: String,
    pub nickname: String,
    pub global_role: GlobalRole,
    pub secret_hash: String,
}

/// Store request for updating a user
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub secret_hash: Option<String>,
}

/// Store response for a user. Carries the secret hash; it must never cross
/// the API model boundary.
#[derive(Debug, Clone)]
pub struct UserDBResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub nickname: String,
    pub global_role: GlobalRole,
    pub secret_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
