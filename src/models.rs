use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Collections) ---

fn default_status() -> String {
    "sale".to_string()
}

/// Property
///
/// A listing document from the `properties` collection. Titles, descriptions
/// and feature lists are multilingual: Turkish and English are mandatory,
/// Arabic and Russian optional. Documents carry two identifiers: the store's
/// native `_id` and an application-assigned UUID in `id`. API responses always
/// expose the string `id` (see [`Property::ensure_public_id`]).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Property {
    /// The store's native key. Never exposed over the API.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    #[ts(skip)]
    #[schema(value_type = Option<String>)]
    pub native_id: Option<ObjectId>,

    /// Application-assigned UUID, set at creation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub title_tr: String,
    pub title_en: String,
    pub title_ar: Option<String>,
    pub title_ru: Option<String>,
    pub description_tr: String,
    pub description_en: String,
    pub description_ar: Option<String>,
    pub description_ru: Option<String>,

    pub price: f64,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub bedrooms: i32,
    pub bathrooms: i32,
    /// Room count in the local "n+1" convention, distinct from bedrooms.
    pub rooms: Option<i32>,
    pub size: f64,
    pub property_type: String,

    // Media. The primary image plus an ordered gallery; video is optional.
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub video: Option<String>,

    #[serde(default)]
    pub features_tr: Vec<String>,
    #[serde(default)]
    pub features_en: Vec<String>,

    /// Free-form listing status, e.g. "sale" or "rent".
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub featured: bool,

    #[ts(type = "string")]
    pub created_at: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Property {
    /// Guarantees the API-facing `id` is populated: keeps the application id
    /// when present, otherwise falls back to the hex of the native key. The
    /// native key itself is cleared so it never leaks into responses.
    pub fn ensure_public_id(mut self) -> Self {
        if self.id.is_none() {
            self.id = self.native_id.map(|oid| oid.to_hex());
        }
        self.native_id = None;
        self
    }
}

/// AboutContent
///
/// Singleton document in `about_content`. Replaced wholesale on every write.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AboutContent {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    #[ts(skip)]
    #[schema(value_type = Option<String>)]
    pub native_id: Option<ObjectId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub content_tr: String,
    pub content_en: String,
    pub content_ar: Option<String>,
    pub content_ru: Option<String>,

    #[ts(type = "string")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl AboutContent {
    pub fn ensure_public_id(mut self) -> Self {
        if self.id.is_none() {
            self.id = self.native_id.map(|oid| oid.to_hex());
        }
        self.native_id = None;
        self
    }
}

/// FooterContent
///
/// Singleton document in `footer_content`: the company blurb per locale plus
/// contact details. Same replace-wholesale semantics as [`AboutContent`].
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct FooterContent {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    #[ts(skip)]
    #[schema(value_type = Option<String>)]
    pub native_id: Option<ObjectId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub company_description_tr: String,
    pub company_description_en: String,
    pub company_description_ar: Option<String>,
    pub company_description_ru: Option<String>,
    pub address: String,
    pub phone: String,
    pub email: String,

    #[ts(type = "string")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl FooterContent {
    pub fn ensure_public_id(mut self) -> Self {
        if self.id.is_none() {
            self.id = self.native_id.map(|oid| oid.to_hex());
        }
        self.native_id = None;
        self
    }
}

/// BlogPost
///
/// Bilingual article from `blog_posts`, listed newest-first.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BlogPost {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    #[ts(skip)]
    #[schema(value_type = Option<String>)]
    pub native_id: Option<ObjectId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub title_tr: String,
    pub title_en: String,
    pub content_tr: String,
    pub content_en: String,

    #[ts(type = "string")]
    pub created_at: Option<DateTime<Utc>>,
}

impl BlogPost {
    pub fn ensure_public_id(mut self) -> Self {
        if self.id.is_none() {
            self.id = self.native_id.map(|oid| oid.to_hex());
        }
        self.native_id = None;
        self
    }
}

/// NewsletterSubscription
///
/// One row per subscriber email in `newsletter`. Email is unique across the
/// collection; the subscribe handler enforces this before inserting.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NewsletterSubscription {
    pub email: String,
    #[ts(type = "string")]
    pub subscribed_at: Option<DateTime<Utc>>,
}

/// User
///
/// Canonical identity record in `users`, created lazily the first time the
/// identity-assertion service vouches for an email we have not seen.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    #[ts(type = "string")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Session
///
/// A bearer session in `user_sessions`. At most one active session exists per
/// user: login deletes all prior sessions before inserting the replacement.
/// Validity means the token matches AND `expires_at` is strictly in the future;
/// expired rows are left in place and simply never match.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
}

/// LogoAsset
///
/// Site logo stored inline in `site_settings`, keyed by the `type`
/// discriminator ("logo" or "header_logo") and replaced wholesale on upload.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LogoAsset {
    #[serde(rename = "type")]
    pub kind: String,
    pub logo_base64: String,
    pub file_extension: String,
    pub filename: String,
    #[ts(type = "string")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

// --- Request Payloads (Input Schemas) ---

/// PropertyRequest
///
/// Validated payload for property create and update. Replaces the loosely
/// typed field bag the handlers used to index into directly: a missing
/// required field is now a structured client error from the JSON layer
/// instead of a runtime fault.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PropertyRequest {
    pub title_tr: String,
    pub title_en: String,
    pub title_ar: Option<String>,
    pub title_ru: Option<String>,
    pub description_tr: String,
    pub description_en: String,
    pub description_ar: Option<String>,
    pub description_ru: Option<String>,
    pub price: f64,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub rooms: Option<i32>,
    pub size: f64,
    pub property_type: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub video: Option<String>,
    #[serde(default)]
    pub features_tr: Vec<String>,
    #[serde(default)]
    pub features_en: Vec<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub featured: bool,
}

impl PropertyRequest {
    /// Materializes a new stored document with a freshly assigned id and
    /// creation timestamp.
    pub fn into_property(self, id: String) -> Property {
        Property {
            native_id: None,
            id: Some(id),
            title_tr: self.title_tr,
            title_en: self.title_en,
            title_ar: self.title_ar,
            title_ru: self.title_ru,
            description_tr: self.description_tr,
            description_en: self.description_en,
            description_ar: self.description_ar,
            description_ru: self.description_ru,
            price: self.price,
            location: self.location,
            latitude: self.latitude,
            longitude: self.longitude,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            rooms: self.rooms,
            size: self.size,
            property_type: self.property_type,
            image_url: self.image_url,
            images: self.images,
            video: self.video,
            features_tr: self.features_tr,
            features_en: self.features_en,
            status: self.status,
            featured: self.featured,
            created_at: Some(Utc::now()),
            updated_at: None,
        }
    }
}

/// BlogPostRequest
///
/// Payload for creating a blog post. Id and timestamp are server-assigned.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BlogPostRequest {
    pub title_tr: String,
    pub title_en: String,
    pub content_tr: String,
    pub content_en: String,
}

/// SubscribeRequest
///
/// Newsletter signup payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SubscribeRequest {
    pub email: String,
}

// --- Query Parameters ---

/// PropertyFilter
///
/// Accepted query parameters for the public listing endpoint. `limit` is a
/// hard cap on an otherwise unordered result set, not a pagination cursor.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams, Default)]
pub struct PropertyFilter {
    pub featured: Option<bool>,
    pub status: Option<String>,
    pub limit: Option<i64>,
}

/// SearchFilter
///
/// Accepted query parameters for property search. All present filters are
/// ANDed; none present yields the full collection.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams, Default)]
pub struct SearchFilter {
    /// Case-insensitive substring match on the location string.
    pub location: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<f64>,
    /// Inclusive upper price bound.
    pub max_price: Option<f64>,
    /// Exact property-type match.
    pub property_type: Option<String>,
    /// Exact bedroom-count match.
    pub bedrooms: Option<i32>,
}

/// BlogFilter
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams, Default)]
pub struct BlogFilter {
    pub limit: Option<i64>,
}

// --- Response Schemas (Output) ---

/// PublicUser
///
/// The user shape returned by the auth endpoints, with the computed
/// `is_admin` flag attached. Internal records never store this flag; it is
/// derived from the allowlist on every request.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub picture: Option<String>,
    pub is_admin: bool,
}

/// AuthResponse
///
/// Result of a successful identity exchange: the resolved user plus the
/// bearer token the client should present from now on.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub session_token: String,
    #[ts(type = "string")]
    pub expires_at: DateTime<Utc>,
}

impl Default for AuthResponse {
    fn default() -> Self {
        Self {
            user: PublicUser::default(),
            session_token: String::new(),
            expires_at: Utc::now(),
        }
    }
}

/// VerifyResponse
///
/// Result of a successful session verification.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct VerifyResponse {
    pub user: PublicUser,
    pub valid: bool,
}

/// MessageResponse
///
/// Generic `{"message": ...}` acknowledgement used by write endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// CreatedResponse
///
/// Acknowledgement carrying the application id assigned to a new document.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatedResponse {
    pub message: String,
    pub id: String,
}

/// LogoResponse
///
/// Either the stored asset or a "nothing stored" marker. The marker is a
/// 200 response, not an error, so the front-end can fall back to its
/// bundled default logo without special-casing.
#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[serde(untagged)]
#[ts(export)]
pub enum LogoResponse {
    Asset {
        logo_base64: String,
        file_extension: String,
        filename: String,
    },
    Missing {
        message: String,
    },
}

impl From<LogoAsset> for LogoResponse {
    fn from(asset: LogoAsset) -> Self {
        LogoResponse::Asset {
            logo_base64: asset.logo_base64,
            file_extension: asset.file_extension,
            filename: asset.filename,
        }
    }
}

/// MapCenter
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MapCenter {
    pub lat: f64,
    pub lng: f64,
}

/// MapImageResponse
///
/// Base64 data-URI of the proxied static-map image plus the center/zoom it
/// was rendered with.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MapImageResponse {
    pub success: bool,
    pub image: String,
    pub center: MapCenter,
    pub zoom: i32,
}
