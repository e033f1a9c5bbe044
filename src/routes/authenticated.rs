use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes that require a valid session but no particular role. The router is
/// wrapped in the `auth_middleware` layer in `create_router`, so requests
/// without a live session never reach these handlers.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // GET /api/auth/verify
        // Session introspection: confirms the bearer token is live and
        // returns the resolved user with the admin flag attached.
        .route("/api/auth/verify", get(handlers::verify_session))
}
