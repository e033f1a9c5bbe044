use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state, loaded once at startup
/// and shared immutably through the application state. Everything that was a
/// hard-coded literal in earlier iterations of the service (admin allowlist,
/// map API key, identity-service URL) lives here so it can be overridden per
/// deployment without touching code.
#[derive(Clone)]
pub struct AppConfig {
    // MongoDB connection string.
    pub mongo_url: String,
    // Database name holding all collections.
    pub db_name: String,
    // Base URL of the external identity-assertion service.
    pub identity_url: String,
    // API key for the static-map image service.
    pub maps_api_key: String,
    // Emails granted admin access. Membership here is the entire authorization model.
    pub admin_emails: Vec<String>,
    // Runtime environment marker. Controls log format and dev-only routes.
    pub env: Env,
}

/// Env
///
/// Runtime context switch between development conveniences (pretty logs,
/// the test-admin bootstrap route) and production behavior (JSON logs,
/// mandatory secrets).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

// The allowlist shipped as a default so local setups work out of the box.
// Production deployments override it via ADMIN_EMAILS.
const DEFAULT_ADMIN_EMAILS: &str = "ali.miolla61@gmail.com,test@admin.com,admin@test.com";

const DEFAULT_IDENTITY_URL: &str =
    "https://demobackend.emergentagent.com/auth/v1/env/oauth/session-data";

impl Default for AppConfig {
    /// Provides a safe, non-panicking AppConfig instance primarily used for
    /// test setup, without requiring any environment variables.
    fn default() -> Self {
        Self {
            mongo_url: "mongodb://localhost:27017".to_string(),
            db_name: "nival_test".to_string(),
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            maps_api_key: "test-maps-key".to_string(),
            admin_emails: parse_admin_emails(DEFAULT_ADMIN_EMAILS),
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// The canonical startup loader. Reads all parameters from environment
    /// variables and fails fast when a production deployment is missing a
    /// required secret, so the process never starts half-configured.
    ///
    /// # Panics
    /// Panics if `MONGO_URL` is unset, or if `GOOGLE_MAPS_API_KEY` is unset
    /// in production.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let maps_api_key = match env {
            Env::Production => env::var("GOOGLE_MAPS_API_KEY")
                .expect("FATAL: GOOGLE_MAPS_API_KEY must be set in production."),
            _ => env::var("GOOGLE_MAPS_API_KEY").unwrap_or_default(),
        };

        let admin_emails =
            env::var("ADMIN_EMAILS").unwrap_or_else(|_| DEFAULT_ADMIN_EMAILS.to_string());

        Self {
            mongo_url: env::var("MONGO_URL").expect("FATAL: MONGO_URL required"),
            db_name: env::var("DB_NAME").unwrap_or_else(|_| "nival".to_string()),
            identity_url: env::var("IDENTITY_API_URL")
                .unwrap_or_else(|_| DEFAULT_IDENTITY_URL.to_string()),
            maps_api_key,
            admin_emails: parse_admin_emails(&admin_emails),
            env,
        }
    }

    /// Whether the given email is on the admin allowlist.
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.iter().any(|e| e == email)
    }
}

fn parse_admin_emails(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect()
}
