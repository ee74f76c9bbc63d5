//! Shared helpers for the test suite.

use crate::api::models::auth::AuthResponse;
use crate::config::{Config, DatabaseConfig};
use crate::db::memory::MemoryStore;
use crate::AppState;
use axum_test::TestServer;
use serde_json::json;
use std::sync::Arc;

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        database: DatabaseConfig::Memory,
        ..Default::default()
    }
}

pub fn create_test_state() -> AppState {
    AppState {
        store: Arc::new(MemoryStore::new()),
        config: create_test_config(),
    }
}

pub async fn create_test_app() -> TestServer {
    let app = crate::Application::new(create_test_config())
        .await
        .expect("Failed to create application");
    app.into_test_server()
}

/// Like [`create_test_app`], but hands back the state so tests can
/// seed the store directly.
pub fn create_test_app_with_state() -> (TestServer, AppState) {
    let state = create_test_state();
    let router = crate::build_router(&state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");
    (server, state)
}

/// Mints a token for a user that already exists in the store.
pub fn token_for(state: &AppState, user: &crate::db::models::users::UserDBResponse) -> String {
    let current = crate::api::models::users::CurrentUser::from(user.clone());
    crate::auth::token::create_access_token(&current, &state.config).expect("Failed to mint token")
}

/// Seeds a user straight into the store with a known password hash.
pub async fn seed_user(
    state: &AppState,
    nickname: &str,
    global_role: crate::api::models::users::GlobalRole,
) -> crate::db::models::users::UserDBResponse {
    let secret_hash =
        crate::auth::password::hash_password("correcthorse").expect("Failed to hash password");
    state
        .store
        .create_user(&crate::db::models::users::UserCreateDBRequest {
            name: format!("{nickname} surname"),
            email: format!("{nickname}@example.com"),
            nickname: nickname.to_string(),
            global_role,
            secret_hash,
        })
        .await
        .expect("Failed to seed user")
}

/// Registers a user through the API and returns the login payload.
pub async fn register_user(server: &TestServer, nickname: &str) -> AuthResponse {
    let response = server
        .post("/authentication/register")
        .json(&json!({
            "name": format!("{nickname} surname"),
            "email": format!("{nickname}@example.com"),
            "nickname": nickname,
            "password": "correcthorse",
        }))
        .await;
    response.assert_status_ok();
    response.json::<AuthResponse>()
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Creates a group through the API, returning its representation.
pub async fn create_group(
    server: &TestServer,
    token: &str,
    name: &str,
) -> crate::api::models::groups::GroupResponse {
    let response = server
        .post("/groups")
        .add_header("authorization", bearer(token))
        .json(&json!({ "name": name }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json()
}
