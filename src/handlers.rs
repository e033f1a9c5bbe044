use crate::{
    AppState,
    auth::{AdminUser, AuthUser},
    error::{ApiError, ApiResult},
    limits,
    models::{
        AboutContent, AuthResponse, BlogFilter, BlogPost, BlogPostRequest, CreatedResponse,
        FooterContent, LogoAsset, LogoResponse, MapImageResponse, MessageResponse,
        NewsletterSubscription, Property, PropertyFilter, PropertyRequest, PublicUser,
        SearchFilter, Session, SubscribeRequest, User, VerifyResponse,
    },
};
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::HeaderMap,
};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

// --- Root ---

/// read_root
///
/// [Public Route] Service banner.
#[utoipa::path(get, path = "/", responses((status = 200, description = "Banner", body = MessageResponse)))]
pub async fn read_root() -> Json<MessageResponse> {
    Json(MessageResponse::new("NiVALiS Real Estate API"))
}

// --- About Content ---

// Hard-coded fallback shown before an admin has saved any about text.
// Returned, never persisted.
fn default_about() -> AboutContent {
    AboutContent {
        content_tr: "NiVALiS İnşaat Gayrimenkul olarak, sektördeki uzun yıllık deneyimimiz ve \
                     profesyonel ekibimizle müşterilerimize en kaliteli hizmeti sunmayı \
                     hedefliyoruz. Türkiye'nin önde gelen gayrimenkul şirketlerinden biri \
                     olarak, konut, ticari gayrimenkul ve yatırım danışmanlığı konularında \
                     uzmanlaşmış durumdayız."
            .to_string(),
        content_en: "As NiVALiS Construction Real Estate, we aim to provide the highest quality \
                     service to our customers with our many years of experience in the sector \
                     and our professional team. As one of Turkey's leading real estate \
                     companies, we specialize in residential, commercial real estate and \
                     investment consultancy."
            .to_string(),
        ..AboutContent::default()
    }
}

/// get_about_content
///
/// [Public Route] Returns the stored about singleton, or the hard-coded
/// default when nothing has been saved yet. The default is never written to
/// the store.
#[utoipa::path(get, path = "/api/about", responses((status = 200, description = "About content", body = AboutContent)))]
pub async fn get_about_content(State(state): State<AppState>) -> ApiResult<Json<AboutContent>> {
    match state.repo.get_about().await? {
        Some(content) => Ok(Json(content)),
        None => Ok(Json(default_about())),
    }
}

/// update_about_content
///
/// [Public Route] Replaces the entire about singleton, stamping `updated_at`.
/// Last writer wins; there is no field-level merge.
#[utoipa::path(put, path = "/api/about", request_body = AboutContent, responses((status = 200, description = "Updated", body = MessageResponse)))]
pub async fn update_about_content(
    State(state): State<AppState>,
    Json(mut content): Json<AboutContent>,
) -> ApiResult<Json<MessageResponse>> {
    content.native_id = None;
    content.updated_at = Some(Utc::now());
    state.repo.put_about(content).await?;
    Ok(Json(MessageResponse::new(
        "About content updated successfully",
    )))
}

// --- Footer Content ---

fn default_footer() -> FooterContent {
    FooterContent {
        company_description_tr:
            "Türkiye'nin önde gelen gayrimenkul şirketi olarak sizlere hizmet veriyoruz."
                .to_string(),
        company_description_en: "As one of Turkey's leading real estate companies, we serve you."
            .to_string(),
        company_description_ar: Some("نحن نخدمكم كشركة عقارية رائدة في تركيا.".to_string()),
        company_description_ru: Some(
            "Мы обслуживаем вас как ведущая турецкая компания недвижимости.".to_string(),
        ),
        address: "Merkez Mah. Albay Burak Cad.\nTaşkan Sezgin İş Hanı No:8\nKat:2/13 Gölcük / Kocaeli"
            .to_string(),
        phone: "+90 (532) 371 81 28".to_string(),
        email: "info@nivalisinsaat.com".to_string(),
        ..FooterContent::default()
    }
}

/// get_footer_content
///
/// [Public Route] Same singleton-or-default semantics as the about block.
#[utoipa::path(get, path = "/api/footer", responses((status = 200, description = "Footer content", body = FooterContent)))]
pub async fn get_footer_content(State(state): State<AppState>) -> ApiResult<Json<FooterContent>> {
    match state.repo.get_footer().await? {
        Some(content) => Ok(Json(content)),
        None => Ok(Json(default_footer())),
    }
}

/// update_footer_content
///
/// [Public Route] Whole-document replace of the footer singleton.
#[utoipa::path(put, path = "/api/footer", request_body = FooterContent, responses((status = 200, description = "Updated", body = MessageResponse)))]
pub async fn update_footer_content(
    State(state): State<AppState>,
    Json(mut content): Json<FooterContent>,
) -> ApiResult<Json<MessageResponse>> {
    content.native_id = None;
    content.updated_at = Some(Utc::now());
    state.repo.put_footer(content).await?;
    Ok(Json(MessageResponse::new(
        "Footer content updated successfully",
    )))
}

// --- Properties ---

/// get_properties
///
/// [Public Route] Lists properties with optional featured/status filters and
/// a hard result cap. The result set carries no ordering guarantee.
#[utoipa::path(
    get,
    path = "/api/properties",
    params(PropertyFilter),
    responses((status = 200, description = "Listings", body = [Property]))
)]
pub async fn get_properties(
    State(state): State<AppState>,
    Query(filter): Query<PropertyFilter>,
) -> ApiResult<Json<Vec<Property>>> {
    Ok(Json(state.repo.list_properties(&filter).await?))
}

/// get_property_by_id
///
/// [Public Route] Single listing by either the store's native id or the
/// application id; the repository resolves the ambiguity (native wins when
/// the value parses as one).
#[utoipa::path(
    get,
    path = "/api/properties/{id}",
    params(("id" = String, Path, description = "Native or application property id")),
    responses(
        (status = 200, description = "Found", body = Property),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_property_by_id(
    State(state): State<AppState>,
    Path(property_id): Path<String>,
) -> ApiResult<Json<Property>> {
    state
        .repo
        .get_property(&property_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Property not found".to_string()))
}

/// create_property
///
/// [Public Route] Legacy unauthenticated property creation kept for the old
/// admin panel; the gated equivalent lives under `/api/admin/properties`.
#[utoipa::path(
    post,
    path = "/api/properties",
    request_body = PropertyRequest,
    responses((status = 200, description = "Created", body = CreatedResponse))
)]
pub async fn create_property(
    State(state): State<AppState>,
    Json(payload): Json<PropertyRequest>,
) -> ApiResult<Json<CreatedResponse>> {
    let id = Uuid::new_v4().to_string();
    let property = payload.into_property(id.clone());
    state.repo.insert_property(property).await?;
    Ok(Json(CreatedResponse {
        message: "Property created successfully".to_string(),
        id,
    }))
}

/// search_properties
///
/// [Public Route] Combined search: substring location match, inclusive price
/// bounds, exact type and bedroom count, all ANDed. An inverted price range
/// (min > max) simply matches nothing.
#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchFilter),
    responses((status = 200, description = "Matching listings", body = [Property]))
)]
pub async fn search_properties(
    State(state): State<AppState>,
    Query(filter): Query<SearchFilter>,
) -> ApiResult<Json<Vec<Property>>> {
    Ok(Json(state.repo.search_properties(&filter).await?))
}

// --- Admin property management ---

/// admin_create_property
///
/// [Admin Route] Gated property creation. The document size is checked
/// before the write: listings embed base64 media, so oversized payloads are
/// rejected up front rather than bounced by the store.
#[utoipa::path(
    post,
    path = "/api/admin/properties",
    request_body = PropertyRequest,
    responses(
        (status = 200, description = "Created", body = CreatedResponse),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Not admin"),
        (status = 413, description = "Document exceeds store limit")
    )
)]
pub async fn admin_create_property(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<PropertyRequest>,
) -> ApiResult<Json<CreatedResponse>> {
    let id = Uuid::new_v4().to_string();
    let property = payload.into_property(id.clone());

    limits::check_document_size(&property)?;

    state.repo.insert_property(property).await?;
    tracing::info!(property_id = %id, "property created");

    Ok(Json(CreatedResponse {
        message: "Property created successfully".to_string(),
        id,
    }))
}

/// admin_update_property
///
/// [Admin Route] Replaces the mutable fields of an existing listing,
/// addressed by application id. Same size guard as creation.
#[utoipa::path(
    put,
    path = "/api/admin/properties/{id}",
    params(("id" = String, Path, description = "Application property id")),
    request_body = PropertyRequest,
    responses(
        (status = 200, description = "Updated", body = MessageResponse),
        (status = 404, description = "Not Found"),
        (status = 413, description = "Document exceeds store limit")
    )
)]
pub async fn admin_update_property(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(property_id): Path<String>,
    Json(payload): Json<PropertyRequest>,
) -> ApiResult<Json<MessageResponse>> {
    limits::check_document_size(&payload)?;

    if !state.repo.update_property(&property_id, &payload).await? {
        return Err(ApiError::NotFound("Property not found".to_string()));
    }

    Ok(Json(MessageResponse::new("Property updated successfully")))
}

/// admin_delete_property
///
/// [Admin Route] Removes a listing by application id.
#[utoipa::path(
    delete,
    path = "/api/admin/properties/{id}",
    params(("id" = String, Path, description = "Application property id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn admin_delete_property(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
    Path(property_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.repo.delete_property(&property_id).await? {
        return Err(ApiError::NotFound("Property not found".to_string()));
    }
    Ok(Json(MessageResponse::new("Property deleted successfully")))
}

// --- Newsletter ---

/// subscribe_newsletter
///
/// [Public Route] One subscription per email; a duplicate is a 409, never a
/// second row.
#[utoipa::path(
    post,
    path = "/api/newsletter/subscribe",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Subscribed", body = MessageResponse),
        (status = 409, description = "Already subscribed")
    )
)]
pub async fn subscribe_newsletter(
    State(state): State<AppState>,
    Json(payload): Json<SubscribeRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if state.repo.find_subscription(&payload.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already subscribed".to_string()));
    }

    state
        .repo
        .insert_subscription(NewsletterSubscription {
            email: payload.email,
            subscribed_at: Some(Utc::now()),
        })
        .await?;

    Ok(Json(MessageResponse::new(
        "Successfully subscribed to newsletter",
    )))
}

// --- Blog ---

/// get_blog_posts
///
/// [Public Route] Posts ordered newest-first, capped at 5 unless the caller
/// asks for more.
#[utoipa::path(
    get,
    path = "/api/blog-posts",
    params(BlogFilter),
    responses((status = 200, description = "Posts", body = [BlogPost]))
)]
pub async fn get_blog_posts(
    State(state): State<AppState>,
    Query(filter): Query<BlogFilter>,
) -> ApiResult<Json<Vec<BlogPost>>> {
    let limit = filter.limit.or(Some(5));
    Ok(Json(state.repo.list_blog_posts(limit).await?))
}

/// create_blog_post
///
/// [Public Route] Inserts a post with a generated id and timestamp.
// TODO: gate behind AdminUser once the admin panel sends the bearer token here.
#[utoipa::path(
    post,
    path = "/api/blog-posts",
    request_body = BlogPostRequest,
    responses((status = 200, description = "Created", body = CreatedResponse))
)]
pub async fn create_blog_post(
    State(state): State<AppState>,
    Json(payload): Json<BlogPostRequest>,
) -> ApiResult<Json<CreatedResponse>> {
    let id = Uuid::new_v4().to_string();
    let post = BlogPost {
        native_id: None,
        id: Some(id.clone()),
        title_tr: payload.title_tr,
        title_en: payload.title_en,
        content_tr: payload.content_tr,
        content_en: payload.content_en,
        created_at: Some(Utc::now()),
    };
    state.repo.insert_blog_post(post).await?;
    Ok(Json(CreatedResponse {
        message: "Blog post created successfully".to_string(),
        id,
    }))
}

// --- Logo assets ---

/// upload_logo
///
/// [Public Route] Reads the multipart field named "logo", base64-encodes the
/// bytes and replaces the stored asset wholesale.
// TODO: gate behind AdminUser once the admin panel sends the bearer token here.
#[utoipa::path(
    post,
    path = "/api/admin/upload-logo",
    responses(
        (status = 200, description = "Uploaded", body = MessageResponse),
        (status = 400, description = "No logo field in the form")
    )
)]
pub async fn upload_logo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<MessageResponse>> {
    use base64::Engine;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("logo") {
            continue;
        }

        let filename = field.file_name().unwrap_or("logo").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read logo file: {}", e)))?;

        let extension = filename
            .rsplit('.')
            .next()
            .unwrap_or("bin")
            .to_lowercase();

        let asset = LogoAsset {
            kind: "logo".to_string(),
            logo_base64: base64::engine::general_purpose::STANDARD.encode(&bytes),
            file_extension: extension,
            filename,
            uploaded_at: Some(Utc::now()),
        };

        state.repo.put_logo(asset).await?;
        return Ok(Json(MessageResponse::new("Logo uploaded successfully")));
    }

    Err(ApiError::BadRequest("No logo file provided".to_string()))
}

/// get_logo
///
/// [Public Route] The stored site logo, or a 200 "not found" marker the
/// front-end treats as "use the bundled default".
#[utoipa::path(get, path = "/api/logo", responses((status = 200, description = "Logo or marker", body = LogoResponse)))]
pub async fn get_logo(State(state): State<AppState>) -> ApiResult<Json<LogoResponse>> {
    match state.repo.get_logo("logo").await? {
        Some(asset) => Ok(Json(asset.into())),
        None => Ok(Json(LogoResponse::Missing {
            message: "No logo found".to_string(),
        })),
    }
}

/// get_header_logo
///
/// [Public Route] Header-specific logo, falling back to the generic logo
/// when no header variant has been uploaded.
#[utoipa::path(get, path = "/api/header-logo", responses((status = 200, description = "Logo or marker", body = LogoResponse)))]
pub async fn get_header_logo(State(state): State<AppState>) -> ApiResult<Json<LogoResponse>> {
    if let Some(asset) = state.repo.get_logo("header_logo").await? {
        return Ok(Json(asset.into()));
    }
    if let Some(asset) = state.repo.get_logo("logo").await? {
        return Ok(Json(asset.into()));
    }
    Ok(Json(LogoResponse::Missing {
        message: "No header logo found".to_string(),
    }))
}

// --- Authentication ---

const SESSION_TTL_DAYS: i64 = 7;

/// Replaces any existing sessions for the user with a single new one.
///
/// The delete-then-insert pair is not atomic: a crash between the two steps
/// leaves the user with zero sessions, which self-heals on the next login.
/// Documented behavior, not a correctness hazard.
async fn establish_session(
    state: &AppState,
    user_id: &str,
    session_token: &str,
) -> ApiResult<DateTime<Utc>> {
    let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);

    state.repo.delete_sessions_for_user(user_id).await?;
    state
        .repo
        .insert_session(Session {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            session_token: session_token.to_string(),
            expires_at,
            created_at: Some(Utc::now()),
        })
        .await?;

    Ok(expires_at)
}

/// get_user_profile
///
/// [Public Route] Login: exchanges the `X-Session-ID` header with the
/// external identity service for a verified profile, lazily creates the
/// user on first sight, and replaces their session with a fresh 7-day one.
#[utoipa::path(
    post,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 400, description = "Missing X-Session-ID header"),
        (status = 401, description = "Identity service rejected the session")
    )
)]
pub async fn get_user_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<AuthResponse>> {
    let session_id = headers
        .get("X-Session-ID")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("Session ID required".to_string()))?;

    let profile = state.identity.exchange_session(session_id).await?;

    let user = match state.repo.find_user_by_email(&profile.email).await? {
        Some(user) => user,
        None => {
            let user = User {
                id: Uuid::new_v4().to_string(),
                email: profile.email.clone(),
                name: profile.name.clone(),
                picture: profile.picture.clone(),
                created_at: Some(Utc::now()),
            };
            state.repo.insert_user(user.clone()).await?;
            user
        }
    };

    let expires_at = establish_session(&state, &user.id, &profile.session_token).await?;
    let is_admin = state.config.is_admin_email(&user.email);

    Ok(Json(AuthResponse {
        user: PublicUser {
            id: user.id,
            email: user.email,
            name: user.name,
            picture: user.picture,
            is_admin,
        },
        session_token: profile.session_token,
        expires_at,
    }))
}

/// verify_session
///
/// [Authenticated Route] Confirms the bearer token maps to a live session
/// and returns the resolved user. Rejection happens in the AuthUser
/// extractor, so reaching the handler body means the session is valid.
#[utoipa::path(
    get,
    path = "/api/auth/verify",
    responses(
        (status = 200, description = "Valid session", body = VerifyResponse),
        (status = 401, description = "Invalid or expired session")
    )
)]
pub async fn verify_session(auth_user: AuthUser) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        user: auth_user.to_public(),
        valid: true,
    })
}

/// logout
///
/// [Public Route] Deletes the session for the presented token. Idempotent
/// by design: a missing or already-invalidated token is still a success.
#[utoipa::path(post, path = "/api/auth/logout", responses((status = 200, description = "Logged out", body = MessageResponse)))]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<MessageResponse>> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|raw| raw.strip_prefix("Bearer ").unwrap_or(raw));

    if let Some(token) = token.filter(|t| !t.is_empty()) {
        state.repo.delete_session_by_token(token).await?;
    }

    Ok(Json(MessageResponse::new("Logged out successfully")))
}

/// create_test_admin
///
/// [Local-Only Route] Bootstrap for manual and automated testing: creates
/// the well-known test admin user and hands back a ready-to-use session
/// token. The route is only registered when running in `Env::Local`.
#[utoipa::path(
    post,
    path = "/api/create-test-admin",
    responses((status = 200, description = "Test admin ready", body = AuthResponse))
)]
pub async fn create_test_admin(State(state): State<AppState>) -> ApiResult<Json<AuthResponse>> {
    const TEST_ADMIN_EMAIL: &str = "test@admin.com";
    const TEST_ADMIN_NAME: &str = "Test Admin User";

    let user = match state.repo.find_user_by_email(TEST_ADMIN_EMAIL).await? {
        Some(user) => user,
        None => {
            let user = User {
                id: Uuid::new_v4().to_string(),
                email: TEST_ADMIN_EMAIL.to_string(),
                name: TEST_ADMIN_NAME.to_string(),
                picture: None,
                created_at: Some(Utc::now()),
            };
            state.repo.insert_user(user.clone()).await?;
            user
        }
    };

    let session_token = format!("test-admin-session-{}", Uuid::new_v4());
    let expires_at = establish_session(&state, &user.id, &session_token).await?;

    Ok(Json(AuthResponse {
        user: PublicUser {
            id: user.id,
            email: user.email,
            name: user.name,
            picture: user.picture,
            is_admin: state.config.is_admin_email(TEST_ADMIN_EMAIL),
        },
        session_token,
        expires_at,
    }))
}

// --- External integrations ---

/// get_google_map
///
/// [Public Route] Proxies the static-map image for the contact page as a
/// base64 data-URI, keeping the API key server-side.
#[utoipa::path(
    get,
    path = "/api/google-map",
    responses(
        (status = 200, description = "Map image", body = MapImageResponse),
        (status = 502, description = "Upstream map service error")
    )
)]
pub async fn get_google_map(State(state): State<AppState>) -> ApiResult<Json<MapImageResponse>> {
    let map = crate::external::fetch_static_map(&state.config.maps_api_key).await?;
    Ok(Json(map))
}
