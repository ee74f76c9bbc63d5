//! API request/response models for authentication.

use crate::api::models::users::UserResponse;
use serde::{Deserialize, Serialize};

/// Request body for registering a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    /// Unique login handle.
    pub nickname: String,
    pub password: String,
}

/// Request body for logging in with nickname/password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub nickname: String,
    pub password: String,
}

/// Successful login: a signed bearer token plus the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}
