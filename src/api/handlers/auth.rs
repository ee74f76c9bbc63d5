//! Registration and login.

use crate::{
    api::models::{
        auth::{AuthResponse, LoginRequest, RegisterRequest},
        users::{CurrentUser, GlobalRole, UserResponse},
    },
    auth::{password, token},
    db::models::users::UserCreateDBRequest,
    errors::{Error, Result},
    AppState,
};
use axum::{extract::State, Json};

fn check_password_length(password: &str, state: &AppState) -> Result<()> {
    let password_config = &state.config.auth.password;
    if password.len() < password_config.min_length {
        return Err(Error::validation(format!(
            "Password must be at least {} characters",
            password_config.min_length
        )));
    }
    if password.len() > password_config.max_length {
        return Err(Error::validation(format!(
            "Password must be no more than {} characters",
            password_config.max_length
        )));
    }
    Ok(())
}

#[tracing::instrument(skip_all, fields(nickname = %request.nickname))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    if !state.config.auth.allow_registration {
        return Err(Error::validation("User registration is disabled"));
    }

    if request.nickname.trim().is_empty() {
        return Err(Error::validation("Nickname must not be empty"));
    }
    if request.name.trim().is_empty() {
        return Err(Error::validation("Name must not be empty"));
    }
    if !request.email.contains('@') {
        return Err(Error::validation("Invalid email address"));
    }
    check_password_length(&request.password, &state)?;

    // Hash the password on a blocking thread to avoid blocking async runtime
    let password = request.password.clone();
    let secret_hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let created = state
        .store
        .create_user(&UserCreateDBRequest {
            name: request.name,
            email: request.email,
            nickname: request.nickname,
            global_role: GlobalRole::User,
            secret_hash,
        })
        .await?;

    let current_user = CurrentUser::from(created.clone());
    let token = token::create_access_token(&current_user, &state.config)?;

    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(created),
    }))
}

#[tracing::instrument(skip_all, fields(nickname = %request.nickname))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    // A missing nickname and a wrong password come out identical.
    let user = state
        .store
        .get_user_by_nickname(&request.nickname)
        .await
        .map_err(|e| match e {
            crate::db::StoreError::NotFound => Error::InvalidCredentials,
            other => other.into(),
        })?;

    // Verify password on a blocking thread to avoid blocking async runtime
    let password = request.password.clone();
    let hash = user.secret_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::InvalidCredentials);
    }

    let current_user = CurrentUser::from(user.clone());
    let token = token::create_access_token(&current_user, &state.config)?;

    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(user),
    }))
}
