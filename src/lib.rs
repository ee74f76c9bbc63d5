//! Shared-household coordination service.
//!
//! Small HTTP API for households (groups) that plan groceries
//! together: shared items, grocery lists, a message board, and
//! shopping schedules, behind nickname/password authentication and
//! group-scoped authorization.
//!
//! The service is organized in three layers:
//! - [`api`]: axum handlers and the request/response models,
//! - [`auth`]: password hashing, token issuing, the auth middleware,
//!   and the group access guards,
//! - [`db`]: the [`db::Store`] abstraction with Postgres and in-memory
//!   backends.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::auth::middleware::require_auth;
use crate::config::{Config, DatabaseConfig};
use crate::db::{memory::MemoryStore, postgres::PostgresStore, Store};
use anyhow::Context;
use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, info, Level};

pub use types::{GroupId, ItemId, ListId, MessageId, ScheduleId, UserId};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Config,
}

/// Get the database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the configured store, running migrations for Postgres.
pub async fn setup_store(config: &Config) -> anyhow::Result<Arc<dyn Store>> {
    match &config.database {
        DatabaseConfig::Memory => {
            info!("Using in-memory store; data will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        DatabaseConfig::External { url } => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("connect to database")?;
            migrator().run(&pool).await.context("run migrations")?;
            info!("Connected to external database");
            Ok(Arc::new(PostgresStore::new(pool)))
        }
    }
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        origins.push(origin.parse::<HeaderValue>()?);
    }
    Ok(CorsLayer::new().allow_origin(origins))
}

/// Build the application router with all endpoints and middleware.
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    use api::handlers::{auth as auth_handlers, groups, items, lists, messages, schedules, users};

    let router = Router::new()
        .route("/status", get(|| async { "OK" }))
        .route("/authentication/register", post(auth_handlers::register))
        .route("/authentication/login", post(auth_handlers::login))
        .route("/users/me", get(users::get_me))
        .route("/users/me", patch(users::update_me))
        .route("/groups", get(groups::list_groups))
        .route("/groups", post(groups::create_group))
        .route("/groups/{group_id}", get(groups::get_group))
        .route("/groups/{group_id}", patch(groups::update_group))
        .route("/groups/{group_id}", delete(groups::delete_group))
        .route("/groups/{group_id}/members", get(groups::list_members))
        .route("/groups/{group_id}/members", post(groups::add_member))
        .route(
            "/groups/{group_id}/members/{user_id}",
            patch(groups::set_member_role),
        )
        .route(
            "/groups/{group_id}/members/{user_id}",
            delete(groups::remove_member),
        )
        .route("/groups/{group_id}/items", get(items::list_items))
        .route("/groups/{group_id}/items", post(items::create_item))
        .route("/groups/{group_id}/items/{item_id}", get(items::get_item))
        .route(
            "/groups/{group_id}/items/{item_id}",
            patch(items::update_item),
        )
        .route(
            "/groups/{group_id}/items/{item_id}",
            delete(items::delete_item),
        )
        .route("/groups/{group_id}/lists", get(lists::list_lists))
        .route("/groups/{group_id}/lists", post(lists::create_list))
        .route("/groups/{group_id}/lists/{list_id}", get(lists::get_list))
        .route(
            "/groups/{group_id}/lists/{list_id}",
            patch(lists::update_list),
        )
        .route(
            "/groups/{group_id}/lists/{list_id}",
            delete(lists::delete_list),
        )
        .route("/groups/{group_id}/messages", get(messages::list_messages))
        .route(
            "/groups/{group_id}/messages",
            post(messages::create_message),
        )
        .route(
            "/groups/{group_id}/schedules",
            get(schedules::list_schedules),
        )
        .route(
            "/groups/{group_id}/schedules",
            post(schedules::create_schedule),
        )
        .route(
            "/groups/{group_id}/schedules/{schedule_id}",
            get(schedules::get_schedule),
        )
        .route(
            "/groups/{group_id}/schedules/{schedule_id}",
            patch(schedules::update_schedule),
        )
        .route(
            "/groups/{group_id}/schedules/{schedule_id}",
            delete(schedules::delete_schedule),
        )
        .layer(from_fn_with_state(state.clone(), require_auth))
        .layer(create_cors_layer(&state.config)?)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state.clone());

    Ok(router)
}

pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting with configuration: {:#?}", config);

        let store = setup_store(&config).await?;
        let state = AppState {
            store,
            config: config.clone(),
        };
        let router = build_router(&state)?;

        Ok(Self { router, config })
    }

    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
