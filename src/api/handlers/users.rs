//! Self-service profile endpoints.

use crate::{
    api::models::users::{CurrentUser, UserResponse, UserUpdate},
    auth::password,
    db::models::users::UserUpdateDBRequest,
    errors::{Error, Result},
    AppState,
};
use axum::{extract::State, Json};

#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn get_me(State(state): State<AppState>, user: CurrentUser) -> Result<Json<UserResponse>> {
    let db_user = state.store.get_user(user.id).await?;
    Ok(Json(UserResponse::from(db_user)))
}

#[tracing::instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_me(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<UserUpdate>,
) -> Result<Json<UserResponse>> {
    if let Some(email) = &request.email {
        if !email.contains('@') {
            return Err(Error::validation("Invalid email address"));
        }
    }
    if let Some(name) = &request.name {
        if name.trim().is_empty() {
            return Err(Error::validation("Name must not be empty"));
        }
    }

    // Changing the password requires proving knowledge of the current one.
    let secret_hash = match &request.new_password {
        Some(new_password) => {
            let current = request
                .current_password
                .as_ref()
                .ok_or_else(|| Error::validation("Current password is required to set a new one"))?;

            let password_config = &state.config.auth.password;
            if new_password.len() < password_config.min_length {
                return Err(Error::validation(format!(
                    "Password must be at least {} characters",
                    password_config.min_length
                )));
            }
            if new_password.len() > password_config.max_length {
                return Err(Error::validation(format!(
                    "Password must be no more than {} characters",
                    password_config.max_length
                )));
            }

            let db_user = state.store.get_user(user.id).await?;
            let current = current.clone();
            let hash = db_user.secret_hash.clone();
            let is_valid =
                tokio::task::spawn_blocking(move || password::verify_password(&current, &hash))
                    .await
                    .map_err(|e| Error::Internal {
                        operation: format!("spawn password verification task: {e}"),
                    })??;
            if !is_valid {
                return Err(Error::InvalidCredentials);
            }

            let new_password = new_password.clone();
            Some(
                tokio::task::spawn_blocking(move || password::hash_password(&new_password))
                    .await
                    .map_err(|e| Error::Internal {
                        operation: format!("spawn password hashing task: {e}"),
                    })??,
            )
        }
        None => None,
    };

    let updated = state
        .store
        .update_user(
            user.id,
            &UserUpdateDBRequest {
                name: request.name,
                email: request.email,
                secret_hash,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(updated)))
}

#[cfg(test)]
mod tests {
    use crate::api::models::users::UserResponse;
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test_log::test(tokio::test)]
    async fn test_update_profile() {
        let app = create_test_app().await;
        let auth = register_user(&app, "dago").await;

        let response = app
            .patch("/users/me")
            .add_header("authorization", bearer(&auth.token))
            .json(&json!({ "name": "new name", "email": "new@example.com" }))
            .await;
        response.assert_status_ok();
        let updated: UserResponse = response.json();
        assert_eq!(updated.name, "new name");
        assert_eq!(updated.email, "new@example.com");
        // Nickname is fixed at registration
        assert_eq!(updated.nickname, "dago");
    }

    #[test_log::test(tokio::test)]
    async fn test_password_change_requires_current_password() {
        let app = create_test_app().await;
        let auth = register_user(&app, "dago").await;

        let response = app
            .patch("/users/me")
            .add_header("authorization", bearer(&auth.token))
            .json(&json!({ "new_password": "newpassword1" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = app
            .patch("/users/me")
            .add_header("authorization", bearer(&auth.token))
            .json(&json!({ "current_password": "wrong", "new_password": "newpassword1" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let response = app
            .patch("/users/me")
            .add_header("authorization", bearer(&auth.token))
            .json(&json!({ "current_password": "correcthorse", "new_password": "newpassword1" }))
            .await;
        response.assert_status_ok();

        // Old password no longer works, new one does
        app.post("/authentication/login")
            .json(&json!({ "nickname": "dago", "password": "correcthorse" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        app.post("/authentication/login")
            .json(&json!({ "nickname": "dago", "password": "newpassword1" }))
            .await
            .assert_status_ok();
    }
}
