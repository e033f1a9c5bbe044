use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, post, put},
};

/// Admin Router Module
///
/// Property-management routes restricted to allowlisted admin emails.
///
/// Access Control:
/// The router is nested under `/api/admin` and wrapped in the
/// `auth_middleware` layer, so every request is authenticated before the
/// handler runs. Each handler additionally takes the `AdminUser` extractor,
/// which rejects authenticated non-admins with 403. Role enforcement lives
/// in the extractor, not in handler bodies.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /api/admin/properties
        // Gated property creation with the document size guard applied
        // before the write.
        .route("/properties", post(handlers::admin_create_property))
        // PUT /api/admin/properties/{id}
        // Replaces the mutable fields of a listing, addressed by
        // application id. Same size guard as creation.
        .route("/properties/{id}", put(handlers::admin_update_property))
        // DELETE /api/admin/properties/{id}
        // Removes a listing by application id.
        .route("/properties/{id}", delete(handlers::admin_delete_property))
}
