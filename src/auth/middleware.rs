use crate::{
    api::models::users::CurrentUser,
    auth::current_user::try_bearer_auth,
    errors::Error,
    AppState,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::trace;

/// Paths reachable without a token. Everything else requires a valid
/// bearer token.
const PUBLIC_PATHS: &[&str] = &[
    "/status",
    "/authentication/login",
    "/authentication/register",
];

fn is_public(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path)
}

/// Authentication gate applied to the whole router. Verifies the bearer
/// token once and stores the resulting [`CurrentUser`] in request
/// extensions for handlers and extractors downstream.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Error> {
    if is_public(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let (mut parts, body) = request.into_parts();
    let user: CurrentUser = match try_bearer_auth(&parts, &state.config) {
        Some(result) => result?,
        None => {
            trace!("Rejected request to {} without credentials", parts.uri.path());
            return Err(Error::Unauthenticated { message: None });
        }
    };
    parts.extensions.insert(user);
    request = Request::from_parts(parts, body);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        assert!(is_public("/status"));
        assert!(is_public("/authentication/login"));
        assert!(is_public("/authentication/register"));
        assert!(!is_public("/groups"));
        assert!(!is_public("/users/me"));
        // Prefix is not enough
        assert!(!is_public("/status/extra"));
    }
}
