use crate::db::errors::StoreError;
use crate::types::GroupId;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Authentication required but not provided
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Login failed. Deliberately does not say whether the nickname or
    /// the password was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Caller is authenticated but not allowed to do this
    #[error("Insufficient permissions to {action} in group {group_id}")]
    Forbidden { action: String, group_id: GroupId },

    /// Invalid request data or business rule violation
    #[error("{message}")]
    Validation { message: String },

    /// Requested resource not found
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Store operation error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Error::NotFound {
            resource: resource.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::Forbidden { .. } => StatusCode::FORBIDDEN,
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Store(store_err) => match store_err {
                StoreError::NotFound => StatusCode::NOT_FOUND,
                StoreError::UniqueViolation { .. } => StatusCode::CONFLICT,
                StoreError::LastAdmin { .. } => StatusCode::CONFLICT,
                StoreError::ForeignKeyViolation { .. } => StatusCode::BAD_REQUEST,
                StoreError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
                StoreError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message
                .clone()
                .unwrap_or_else(|| "Authentication required".to_string()),
            Error::InvalidCredentials => "Invalid nickname or password".to_string(),
            Error::Forbidden { action, .. } => {
                format!("Insufficient permissions to {action}")
            }
            Error::Validation { message } => message.clone(),
            Error::NotFound { resource } => format!("{resource} not found"),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Store(store_err) => match store_err {
                StoreError::NotFound => "Resource not found".to_string(),
                StoreError::UniqueViolation {
                    constraint, table, ..
                } => match (table.as_deref(), constraint.as_deref()) {
                    (Some("users"), Some(c)) if c.contains("email") => {
                        "An account with this email address already exists".to_string()
                    }
                    (Some("users"), Some(c)) if c.contains("nickname") => {
                        "This nickname is already taken".to_string()
                    }
                    (Some("memberships"), _) => {
                        "User is already a member of this group".to_string()
                    }
                    _ => "Resource already exists".to_string(),
                },
                StoreError::LastAdmin { .. } => {
                    "Cannot remove the only admin of a group that still has members".to_string()
                }
                StoreError::ForeignKeyViolation { .. } => {
                    "Invalid reference to related resource".to_string()
                }
                StoreError::CheckViolation { constraint, .. } => match constraint.as_deref() {
                    Some("items_price_check") => "Price must not be negative".to_string(),
                    Some("schedules_date_check") => {
                        "Start date must precede end date".to_string()
                    }
                    _ => "Invalid data provided".to_string(),
                },
                StoreError::Other(_) => "Database error occurred".to_string(),
            },
            Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Store(StoreError::Other(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Store(_) => {
                tracing::warn!("Store constraint error: {}", self);
            }
            Error::Unauthenticated { .. } | Error::InvalidCredentials | Error::Forbidden { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::Validation { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        (status, self.user_message()).into_response()
    }
}

/// Type alias for handler results
pub type Result<T> = std::result::Result<T, Error>;
