use nivalis_api::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    external::{HttpIdentityClient, IdentityState},
    repository::{MongoRepository, RepositoryState},
    seed,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// The asynchronous entry point for the application, responsible for
/// initializing all core components: Configuration, Logging, Database,
/// Identity client, and the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    // AppConfig::load() implements the fail-fast principle for missing Production secrets.
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // Prioritizes RUST_LOG, falling back to sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "nivalis_api=debug,tower_http=info,axum=trace".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            // LOCAL: pretty print output for human readability.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON output for ingestion by centralized log aggregators.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Database Initialization (MongoDB)
    // Connects with a bounded server-selection timeout and verifies the
    // deployment with a ping before serving traffic.
    let mongo = MongoRepository::connect(&config)
        .await
        .expect("FATAL: Failed to connect to MongoDB. Check MONGO_URL.");

    if let Err(e) = mongo.ensure_indexes().await {
        tracing::warn!(error = %e, "index creation failed, continuing without");
    }

    let repo = Arc::new(mongo) as RepositoryState;

    // 5. Sample Data Seeding
    // First-run convenience so the site is not blank before an admin has
    // entered content. Failure is logged, never fatal.
    if let Err(e) = seed::initialize_sample_data(&repo).await {
        tracing::error!(error = %e, "sample data initialization failed");
    }

    // 6. Identity Client Initialization
    let identity = Arc::new(HttpIdentityClient::new(&config.identity_url)) as IdentityState;

    // 7. Unified State Assembly
    let app_state = AppState {
        repo,
        identity,
        config,
    };

    // 8. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind("0.0.0.0:8001").await.unwrap();

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on 0.0.0.0:8001");
    tracing::info!("API Documentation (Swagger UI) available at: http://localhost:8001/swagger-ui");

    axum::serve(listener, app).await.unwrap();
}
