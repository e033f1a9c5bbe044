use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use crate::{
    config::AppConfig,
    error::ApiError,
    models::{PublicUser, User},
    repository::RepositoryState,
};

/// Extracts the bearer token from an Authorization header value. The
/// "Bearer " scheme prefix is optional; a bare token is accepted as-is.
pub fn bearer_token(parts: &Parts) -> Option<String> {
    let raw = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())?;

    let token = raw.strip_prefix("Bearer ").unwrap_or(raw);
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// AuthUser
///
/// The resolved identity of an authenticated request: the stored user record
/// plus the `is_admin` flag computed from the configured allowlist. Admin
/// status is never persisted; it is derived fresh on every request so
/// allowlist changes take effect immediately.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub is_admin: bool,
}

impl AuthUser {
    /// The API-facing user shape, with `is_admin` attached.
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.user.id.clone(),
            email: self.user.email.clone(),
            name: self.user.name.clone(),
            picture: self.user.picture.clone(),
            is_admin: self.is_admin,
        }
    }
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a
/// function argument in any handler that needs a verified caller. This
/// replaces the inline token-lookup block that used to be repeated in every
/// privileged handler with a single reusable guard.
///
/// The process:
/// 1. Bearer token extraction from the Authorization header.
/// 2. Session lookup by token, with the expiry check applied by the repository.
/// 3. User resolution; a dangling session (user deleted) is treated as invalid.
///
/// Rejection: 401 Unauthenticated on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthenticated("No session token provided".to_string()))?;

        let session = repo
            .find_valid_session(&token)
            .await?
            .ok_or_else(|| ApiError::Unauthenticated("Invalid or expired session".to_string()))?;

        let user = repo
            .find_user_by_id(&session.user_id)
            .await?
            .ok_or_else(|| ApiError::Unauthenticated("User not found".to_string()))?;

        let is_admin = config.is_admin_email(&user.email);

        Ok(AuthUser { user, is_admin })
    }
}

/// AdminUser
///
/// Wrapper extractor for admin-gated routes: authenticates like [`AuthUser`]
/// and then requires allowlist membership, rejecting everyone else with 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_user = AuthUser::from_request_parts(parts, state).await?;

        if !auth_user.is_admin {
            return Err(ApiError::Forbidden("Admin access required".to_string()));
        }

        Ok(AdminUser(auth_user))
    }
}
