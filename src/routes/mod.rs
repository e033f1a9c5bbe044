/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules.
/// Access control is applied explicitly at the module level (via Axum layers
/// and extractors), so a route's placement documents its exposure.

/// Routes accessible to all clients, anonymous or logged-in.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware.
/// Requires a validated user session.
pub mod authenticated;

/// Routes restricted to users on the admin email allowlist.
pub mod admin;
