//! Authentication and authorization.
//!
//! Credentials are nickname plus password. Passwords are hashed with
//! Argon2id and never leave the store layer; logins mint a signed JWT
//! that carries the user's id, nickname, and application-wide role.
//!
//! Authorization has two layers:
//! - [`middleware::require_auth`] gates every non-public route behind a
//!   valid bearer token,
//! - [`permissions`] guards group-scoped resources by membership and
//!   group role, with an override for application admins.
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use pantry::api::models::users::CurrentUser;
//!
//! async fn protected_handler(user: CurrentUser) -> String {
//!     format!("Hello, {}!", user.nickname)
//! }
//! ```

pub mod current_user;
pub mod middleware;
pub mod password;
pub mod permissions;
pub mod token;
