use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod limits;
pub mod models;
pub mod repository;
pub mod seed;

// Module for routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use config::{AppConfig, Env};
pub use error::{ApiError, ApiResult};
pub use external::{HttpIdentityClient, IdentityState, MockIdentityService};
pub use repository::{MongoRepository, RepositoryState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the
/// application from the `#[utoipa::path]` and `ToSchema` annotations.
/// The resulting JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::read_root,
        handlers::get_about_content, handlers::update_about_content,
        handlers::get_footer_content, handlers::update_footer_content,
        handlers::get_properties, handlers::get_property_by_id,
        handlers::create_property, handlers::search_properties,
        handlers::admin_create_property, handlers::admin_update_property,
        handlers::admin_delete_property,
        handlers::subscribe_newsletter,
        handlers::get_blog_posts, handlers::create_blog_post,
        handlers::upload_logo, handlers::get_logo, handlers::get_header_logo,
        handlers::get_user_profile, handlers::verify_session, handlers::logout,
        handlers::create_test_admin,
        handlers::get_google_map,
    ),
    components(
        schemas(
            models::Property, models::PropertyRequest,
            models::AboutContent, models::FooterContent,
            models::BlogPost, models::BlogPostRequest,
            models::NewsletterSubscription, models::SubscribeRequest,
            models::LogoAsset, models::LogoResponse,
            models::PublicUser, models::AuthResponse, models::VerifyResponse,
            models::MessageResponse, models::CreatedResponse,
            models::MapCenter, models::MapImageResponse,
        )
    ),
    tags(
        (name = "nivalis-api", description = "NiVALiS Real Estate API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Implements the **Unified State Pattern**: a single, thread-safe container
/// holding all application services and configuration, shared across every
/// incoming request.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: abstracts document-store access.
    pub repo: RepositoryState,
    /// Identity Layer: abstracts the external identity-assertion service.
    pub identity: IdentityState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These let extractors pull individual components out of the shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for IdentityState {
    fn from_ref(app_state: &AppState) -> IdentityState {
        app_state.identity.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for the routers it wraps. It attempts to extract
/// `AuthUser` from the request; the extractor rejects with 401 before the
/// handler runs if the bearer token does not map to a live session. Role
/// checks happen separately in the `AdminUser` extractor.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and
/// scoped middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let mut base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: no middleware applied.
        .merge(public::public_routes())
        // Authenticated Routes: protected by the `auth_middleware`.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Admin Routes: nested under '/api/admin'. Authentication happens in
        // the layer; the admin role check happens in the `AdminUser`
        // extractor each handler takes.
        .nest(
            "/api/admin",
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    // Local-only bootstrap endpoint, never registered in production.
    if state.config.env == Env::Local {
        base_router = base_router.route(
            "/api/create-test-admin",
            axum::routing::post(handlers::create_test_admin),
        );
    }

    let base_router = base_router.with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // Request ID generation: a unique UUID for every request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // Request tracing: wraps the request/response lifecycle in a
                // span correlated by the generated request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Request ID propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes `TraceLayer` span creation: every log line for a request
/// carries the method, URI and the correlating `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
