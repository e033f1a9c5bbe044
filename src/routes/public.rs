use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any
/// client. This covers the whole read side of the site plus the login
/// bootstrap, and a handful of write endpoints the legacy admin panel calls
/// without a token (marked below).
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Service banner, also handy as a smoke-test target.
        .route("/", get(handlers::read_root))
        // GET /health
        // Unauthenticated endpoint for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // GET/PUT /api/about
        // The about-page singleton. The PUT is intentionally open: the legacy
        // admin panel saves content without a session token.
        .route(
            "/api/about",
            get(handlers::get_about_content).put(handlers::update_about_content),
        )
        // GET/PUT /api/footer
        // Footer singleton, same open-PUT caveat as /api/about.
        .route(
            "/api/footer",
            get(handlers::get_footer_content).put(handlers::update_footer_content),
        )
        // GET /api/properties?featured=...&status=...&limit=...
        // POST /api/properties
        // Listing feed plus the legacy ungated creation endpoint. The gated
        // equivalent lives under /api/admin/properties.
        .route(
            "/api/properties",
            get(handlers::get_properties).post(handlers::create_property),
        )
        // GET /api/properties/{id}
        // Single listing, addressable by native or application id.
        .route("/api/properties/{id}", get(handlers::get_property_by_id))
        // GET /api/search?location=...&min_price=...&max_price=...
        // Combined property search with ANDed criteria.
        .route("/api/search", get(handlers::search_properties))
        // POST /api/newsletter/subscribe
        // One subscription per email, duplicate is a 409.
        .route(
            "/api/newsletter/subscribe",
            post(handlers::subscribe_newsletter),
        )
        // GET /api/blog-posts?limit=...
        // POST /api/blog-posts
        // Blog feed (newest first, default cap 5) and the ungated creation
        // endpoint the admin panel uses.
        .route(
            "/api/blog-posts",
            get(handlers::get_blog_posts).post(handlers::create_blog_post),
        )
        // POST /api/admin/upload-logo
        // Multipart logo upload. Lives under the /api/admin prefix for the
        // panel's sake but is not token-gated.
        .route("/api/admin/upload-logo", post(handlers::upload_logo))
        // GET /api/logo and /api/header-logo
        // Stored logo assets; header-logo falls back to the generic logo.
        .route("/api/logo", get(handlers::get_logo))
        .route("/api/header-logo", get(handlers::get_header_logo))
        // POST /api/auth/profile
        // Login: exchanges the X-Session-ID header with the identity service.
        .route("/api/auth/profile", post(handlers::get_user_profile))
        // POST /api/auth/logout
        // Idempotent session teardown.
        .route("/api/auth/logout", post(handlers::logout))
        // GET /api/google-map
        // Static-map proxy for the contact page.
        .route("/api/google-map", get(handlers::get_google_map))
}
