use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{ApiError, ApiResult};
use crate::models::{MapCenter, MapImageResponse};

// 1. IdentityService Contract

/// IdentityProfile
///
/// The verified profile the identity-assertion service returns in exchange
/// for an opaque session id.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IdentityProfile {
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub session_token: String,
}

/// IdentityService
///
/// Abstract contract for the external identity-assertion lookup. The trait
/// boundary lets tests exercise the whole login flow against
/// [`MockIdentityService`] without any network traffic.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Exchanges an opaque session id for a verified user profile.
    ///
    /// Error mapping is part of the contract: a transport failure means the
    /// service is unreachable, a non-success status means the session id was
    /// not accepted. Both surface as 401 to the caller.
    async fn exchange_session(&self, session_id: &str) -> ApiResult<IdentityProfile>;
}

/// IdentityState
///
/// The concrete type used to share the identity client across the
/// application state.
pub type IdentityState = Arc<dyn IdentityService>;

// 2. The Real Implementation

/// HttpIdentityClient
///
/// Production client calling the identity service over HTTPS. Carries a
/// bounded deadline so a stalled upstream cannot pin request handlers.
#[derive(Clone)]
pub struct HttpIdentityClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpIdentityClient {
    pub fn new(endpoint: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }
}

#[async_trait]
impl IdentityService for HttpIdentityClient {
    async fn exchange_session(&self, session_id: &str) -> ApiResult<IdentityProfile> {
        let response = self
            .client
            .get(&self.endpoint)
            .header("X-Session-ID", session_id)
            .send()
            .await
            .map_err(|_| {
                ApiError::Unauthenticated("Authentication service unavailable".to_string())
            })?;

        if !response.status().is_success() {
            return Err(ApiError::Unauthenticated("Invalid session".to_string()));
        }

        response
            .json::<IdentityProfile>()
            .await
            .map_err(|e| ApiError::Internal(format!("Malformed identity response: {}", e)))
    }
}

// 3. The Mock Implementation (For Tests)

/// MockIdentityService
///
/// In-memory stand-in for the identity service used by unit and integration
/// tests. Returns a pre-canned profile, or a simulated outage when
/// `should_fail` is set.
#[derive(Clone, Default)]
pub struct MockIdentityService {
    pub profile: IdentityProfile,
    pub should_fail: bool,
}

impl MockIdentityService {
    pub fn returning(profile: IdentityProfile) -> Self {
        Self {
            profile,
            should_fail: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            profile: IdentityProfile::default(),
            should_fail: true,
        }
    }
}

#[async_trait]
impl IdentityService for MockIdentityService {
    async fn exchange_session(&self, _session_id: &str) -> ApiResult<IdentityProfile> {
        if self.should_fail {
            return Err(ApiError::Unauthenticated(
                "Authentication service unavailable".to_string(),
            ));
        }
        Ok(self.profile.clone())
    }
}

// 4. Static-map fetch

// The fixed map view rendered on the contact page: İstanbul city center.
const MAP_LAT: f64 = 41.0082;
const MAP_LNG: f64 = 28.9784;
const MAP_ZOOM: i32 = 12;
const MAP_SIZE: &str = "800x400";

/// fetch_static_map
///
/// Downloads the static-map image from the third-party service and re-wraps
/// the bytes as a base64 data-URI so the front-end never sees the API key.
/// Upstream non-success becomes 502; a transport failure becomes a service
/// error. Bounded by a 10-second timeout either way.
pub async fn fetch_static_map(api_key: &str) -> ApiResult<MapImageResponse> {
    let url = format!(
        "https://maps.googleapis.com/maps/api/staticmap?center={lat},{lng}&zoom={zoom}&size={size}&maptype=roadmap&markers=color:red%7Clabel:N%7C{lat},{lng}&key={key}",
        lat = MAP_LAT,
        lng = MAP_LNG,
        zoom = MAP_ZOOM,
        size = MAP_SIZE,
        key = api_key,
    );

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_default();

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| ApiError::Service(format!("Network error: {}", e)))?;

    if !response.status().is_success() {
        return Err(ApiError::BadGateway(format!(
            "Google Maps API error: {}",
            response.status().as_u16()
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ApiError::Service(format!("Network error: {}", e)))?;

    Ok(MapImageResponse {
        success: true,
        image: format!("data:image/png;base64,{}", BASE64.encode(&bytes)),
        center: MapCenter {
            lat: MAP_LAT,
            lng: MAP_LNG,
        },
        zoom: MAP_ZOOM,
    })
}
