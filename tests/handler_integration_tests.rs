use async_trait::async_trait;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
};
use chrono::{Duration, Utc};
use nivalis_api::{
    AppState,
    auth::{AdminUser, AuthUser},
    config::AppConfig,
    error::ApiResult,
    external::{IdentityProfile, MockIdentityService},
    handlers,
    models::{
        AboutContent, BlogFilter, BlogPost, FooterContent, LogoAsset, LogoResponse,
        NewsletterSubscription, Property, PropertyFilter, PropertyRequest, SearchFilter, Session,
        SubscribeRequest, User,
    },
    repository::Repository,
};
use std::sync::{Arc, Mutex};
use tokio::test;

// --- MOCK REPOSITORY IMPLEMENTATION ---

// In-memory document store backing the handler tests. Handlers depend on the
// Repository trait, so the whole HTTP surface runs against this without a
// database. State lives behind a Mutex so tests can inspect what the
// handlers wrote.
#[derive(Default)]
pub struct MockRepoState {
    pub properties: Vec<Property>,
    pub about: Option<AboutContent>,
    pub footer: Option<FooterContent>,
    pub subscriptions: Vec<NewsletterSubscription>,
    pub blog_posts: Vec<BlogPost>,
    pub users: Vec<User>,
    pub sessions: Vec<Session>,
    pub logos: Vec<LogoAsset>,

    // Call recording for assertions.
    pub about_writes: usize,
    pub last_blog_limit: Option<Option<i64>>,
}

#[derive(Default)]
pub struct MockRepo {
    pub state: Mutex<MockRepoState>,
}

impl MockRepo {
    fn lock(&self) -> std::sync::MutexGuard<'_, MockRepoState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl Repository for MockRepo {
    async fn list_properties(&self, filter: &PropertyFilter) -> ApiResult<Vec<Property>> {
        let state = self.lock();
        let mut result: Vec<Property> = state
            .properties
            .iter()
            .filter(|p| filter.featured.is_none_or(|f| p.featured == f))
            .filter(|p| filter.status.as_ref().is_none_or(|s| &p.status == s))
            .cloned()
            .collect();
        if let Some(limit) = filter.limit {
            result.truncate(limit as usize);
        }
        Ok(result)
    }

    async fn get_property(&self, property_id: &str) -> ApiResult<Option<Property>> {
        let state = self.lock();
        // Mirrors the dual-interpretation lookup: a value parseable as a
        // native id is matched against _id only.
        let found = match bson::oid::ObjectId::parse_str(property_id) {
            Ok(oid) => state.properties.iter().find(|p| p.native_id == Some(oid)),
            Err(_) => state
                .properties
                .iter()
                .find(|p| p.id.as_deref() == Some(property_id)),
        };
        Ok(found.cloned().map(Property::ensure_public_id))
    }

    async fn search_properties(&self, filter: &SearchFilter) -> ApiResult<Vec<Property>> {
        let state = self.lock();
        Ok(state
            .properties
            .iter()
            .filter(|p| {
                filter
                    .location
                    .as_ref()
                    .is_none_or(|loc| p.location.to_lowercase().contains(&loc.to_lowercase()))
            })
            .filter(|p| filter.min_price.is_none_or(|min| p.price >= min))
            .filter(|p| filter.max_price.is_none_or(|max| p.price <= max))
            .filter(|p| {
                filter
                    .property_type
                    .as_ref()
                    .is_none_or(|t| &p.property_type == t)
            })
            .filter(|p| filter.bedrooms.is_none_or(|b| p.bedrooms == b))
            .cloned()
            .collect())
    }

    async fn insert_property(&self, property: Property) -> ApiResult<()> {
        self.lock().properties.push(property);
        Ok(())
    }

    async fn update_property(&self, property_id: &str, req: &PropertyRequest) -> ApiResult<bool> {
        let mut state = self.lock();
        match state
            .properties
            .iter_mut()
            .find(|p| p.id.as_deref() == Some(property_id))
        {
            Some(p) => {
                p.title_tr = req.title_tr.clone();
                p.price = req.price;
                p.updated_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_property(&self, property_id: &str) -> ApiResult<bool> {
        let mut state = self.lock();
        let before = state.properties.len();
        state
            .properties
            .retain(|p| p.id.as_deref() != Some(property_id));
        Ok(state.properties.len() < before)
    }

    async fn count_properties(&self) -> ApiResult<u64> {
        Ok(self.lock().properties.len() as u64)
    }

    async fn insert_properties(&self, properties: Vec<Property>) -> ApiResult<()> {
        self.lock().properties.extend(properties);
        Ok(())
    }

    async fn get_about(&self) -> ApiResult<Option<AboutContent>> {
        Ok(self.lock().about.clone())
    }

    async fn put_about(&self, content: AboutContent) -> ApiResult<()> {
        let mut state = self.lock();
        state.about = Some(content);
        state.about_writes += 1;
        Ok(())
    }

    async fn get_footer(&self) -> ApiResult<Option<FooterContent>> {
        Ok(self.lock().footer.clone())
    }

    async fn put_footer(&self, content: FooterContent) -> ApiResult<()> {
        self.lock().footer = Some(content);
        Ok(())
    }

    async fn find_subscription(&self, email: &str) -> ApiResult<Option<NewsletterSubscription>> {
        Ok(self
            .lock()
            .subscriptions
            .iter()
            .find(|s| s.email == email)
            .cloned())
    }

    async fn insert_subscription(&self, subscription: NewsletterSubscription) -> ApiResult<()> {
        self.lock().subscriptions.push(subscription);
        Ok(())
    }

    async fn list_blog_posts(&self, limit: Option<i64>) -> ApiResult<Vec<BlogPost>> {
        let mut state = self.lock();
        state.last_blog_limit = Some(limit);
        let mut posts = state.blog_posts.clone();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            posts.truncate(limit as usize);
        }
        Ok(posts)
    }

    async fn insert_blog_post(&self, post: BlogPost) -> ApiResult<()> {
        self.lock().blog_posts.push(post);
        Ok(())
    }

    async fn count_blog_posts(&self) -> ApiResult<u64> {
        Ok(self.lock().blog_posts.len() as u64)
    }

    async fn insert_blog_posts(&self, posts: Vec<BlogPost>) -> ApiResult<()> {
        self.lock().blog_posts.extend(posts);
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, user_id: &str) -> ApiResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn insert_user(&self, user: User) -> ApiResult<()> {
        self.lock().users.push(user);
        Ok(())
    }

    async fn find_valid_session(&self, token: &str) -> ApiResult<Option<Session>> {
        Ok(self
            .lock()
            .sessions
            .iter()
            .find(|s| s.session_token == token && s.expires_at > Utc::now())
            .cloned())
    }

    async fn insert_session(&self, session: Session) -> ApiResult<()> {
        self.lock().sessions.push(session);
        Ok(())
    }

    async fn delete_sessions_for_user(&self, user_id: &str) -> ApiResult<u64> {
        let mut state = self.lock();
        let before = state.sessions.len();
        state.sessions.retain(|s| s.user_id != user_id);
        Ok((before - state.sessions.len()) as u64)
    }

    async fn delete_session_by_token(&self, token: &str) -> ApiResult<u64> {
        let mut state = self.lock();
        let before = state.sessions.len();
        state.sessions.retain(|s| s.session_token != token);
        Ok((before - state.sessions.len()) as u64)
    }

    async fn get_logo(&self, kind: &str) -> ApiResult<Option<LogoAsset>> {
        Ok(self.lock().logos.iter().find(|l| l.kind == kind).cloned())
    }

    async fn put_logo(&self, asset: LogoAsset) -> ApiResult<()> {
        let mut state = self.lock();
        state.logos.retain(|l| l.kind != asset.kind);
        state.logos.push(asset);
        Ok(())
    }
}

// --- TEST UTILITIES ---

fn create_test_state() -> (Arc<MockRepo>, AppState) {
    create_test_state_with_identity(MockIdentityService::default())
}

fn create_test_state_with_identity(identity: MockIdentityService) -> (Arc<MockRepo>, AppState) {
    let repo = Arc::new(MockRepo::default());
    let state = AppState {
        repo: repo.clone(),
        identity: Arc::new(identity),
        config: AppConfig::default(),
    };
    (repo, state)
}

fn admin_user() -> AdminUser {
    AdminUser(AuthUser {
        user: User {
            id: "admin-1".to_string(),
            email: "test@admin.com".to_string(),
            name: "Test Admin".to_string(),
            picture: None,
            created_at: Some(Utc::now()),
        },
        is_admin: true,
    })
}

fn sample_property(id: &str, price: f64, location: &str) -> Property {
    Property {
        id: Some(id.to_string()),
        title_tr: "Test İlan".to_string(),
        title_en: "Test Listing".to_string(),
        price,
        location: location.to_string(),
        bedrooms: 3,
        bathrooms: 2,
        size: 120.0,
        property_type: "Apartment".to_string(),
        status: "sale".to_string(),
        ..Property::default()
    }
}

fn sample_request() -> PropertyRequest {
    PropertyRequest {
        title_tr: "Yeni İlan".to_string(),
        title_en: "New Listing".to_string(),
        description_tr: "Açıklama".to_string(),
        description_en: "Description".to_string(),
        price: 300_000.0,
        location: "İzmir".to_string(),
        bedrooms: 2,
        bathrooms: 1,
        size: 95.0,
        property_type: "Apartment".to_string(),
        status: "sale".to_string(),
        ..PropertyRequest::default()
    }
}

// --- CONTENT SINGLETON TESTS ---

#[test]
async fn test_get_about_returns_default_without_writing() {
    let (repo, state) = create_test_state();

    let result = handlers::get_about_content(State(state)).await;

    assert!(result.is_ok());
    let Json(content) = result.unwrap();
    assert!(content.content_tr.contains("NiVALiS"));
    assert!(content.content_en.contains("NiVALiS"));
    // The default must never be persisted.
    assert_eq!(repo.lock().about_writes, 0);
    assert!(repo.lock().about.is_none());
}

#[test]
async fn test_get_about_returns_stored_content() {
    let (repo, state) = create_test_state();
    repo.lock().about = Some(AboutContent {
        content_tr: "Özel içerik".to_string(),
        content_en: "Custom content".to_string(),
        ..AboutContent::default()
    });

    let Json(content) = handlers::get_about_content(State(state)).await.unwrap();
    assert_eq!(content.content_tr, "Özel içerik");
}

#[test]
async fn test_update_about_stamps_timestamp() {
    let (repo, state) = create_test_state();

    let payload = AboutContent {
        content_tr: "Yeni".to_string(),
        content_en: "New".to_string(),
        ..AboutContent::default()
    };
    let result = handlers::update_about_content(State(state), Json(payload)).await;

    assert!(result.is_ok());
    let stored = repo.lock().about.clone().unwrap();
    assert_eq!(stored.content_tr, "Yeni");
    assert!(stored.updated_at.is_some());
}

#[test]
async fn test_get_footer_returns_default_contact_details() {
    let (_repo, state) = create_test_state();

    let Json(content) = handlers::get_footer_content(State(state)).await.unwrap();
    assert_eq!(content.email, "info@nivalisinsaat.com");
    assert!(content.phone.starts_with("+90"));
}

// --- PROPERTY TESTS ---

#[test]
async fn test_get_property_by_app_id() {
    let (repo, state) = create_test_state();
    repo.lock()
        .properties
        .push(sample_property("prop-1", 100_000.0, "İstanbul"));

    let result =
        handlers::get_property_by_id(State(state), Path("prop-1".to_string())).await;

    assert!(result.is_ok());
    let Json(property) = result.unwrap();
    assert_eq!(property.id.as_deref(), Some("prop-1"));
}

#[test]
async fn test_get_property_not_found() {
    let (_repo, state) = create_test_state();

    let result =
        handlers::get_property_by_id(State(state), Path("missing".to_string())).await;

    assert!(result.is_err());
    assert_eq!(result.unwrap_err().status_code(), StatusCode::NOT_FOUND);
}

#[test]
async fn test_list_properties_featured_filter() {
    let (repo, state) = create_test_state();
    {
        let mut inner = repo.lock();
        let mut featured = sample_property("p1", 100.0, "A");
        featured.featured = true;
        inner.properties.push(featured);
        inner.properties.push(sample_property("p2", 200.0, "B"));
    }

    let Json(properties) = handlers::get_properties(
        State(state),
        Query(PropertyFilter {
            featured: Some(true),
            ..PropertyFilter::default()
        }),
    )
    .await
    .unwrap();

    assert_eq!(properties.len(), 1);
    assert_eq!(properties[0].id.as_deref(), Some("p1"));
}

#[test]
async fn test_search_price_bounds_inclusive() {
    let (repo, state) = create_test_state();
    {
        let mut inner = repo.lock();
        inner.properties.push(sample_property("low", 100_000.0, "A"));
        inner.properties.push(sample_property("mid", 250_000.0, "B"));
        inner.properties.push(sample_property("high", 500_000.0, "C"));
    }

    let Json(found) = handlers::search_properties(
        State(state),
        Query(SearchFilter {
            min_price: Some(100_000.0),
            max_price: Some(250_000.0),
            ..SearchFilter::default()
        }),
    )
    .await
    .unwrap();

    // Bounds are inclusive on both ends.
    assert_eq!(found.len(), 2);
}

#[test]
async fn test_search_inverted_price_range_matches_nothing() {
    let (repo, state) = create_test_state();
    repo.lock()
        .properties
        .push(sample_property("p1", 250_000.0, "A"));

    let Json(found) = handlers::search_properties(
        State(state),
        Query(SearchFilter {
            min_price: Some(500_000.0),
            max_price: Some(100_000.0),
            ..SearchFilter::default()
        }),
    )
    .await
    .unwrap();

    assert!(found.is_empty());
}

#[test]
async fn test_search_location_case_insensitive_substring() {
    let (repo, state) = create_test_state();
    repo.lock()
        .properties
        .push(sample_property("p1", 100.0, "İstanbul, Beşiktaş"));

    let Json(found) = handlers::search_properties(
        State(state),
        Query(SearchFilter {
            location: Some("beşiktaş".to_string()),
            ..SearchFilter::default()
        }),
    )
    .await
    .unwrap();

    assert_eq!(found.len(), 1);
}

#[test]
async fn test_public_create_property_assigns_id() {
    let (repo, state) = create_test_state();

    let result = handlers::create_property(State(state), Json(sample_request())).await;

    assert!(result.is_ok());
    let Json(created) = result.unwrap();
    assert!(!created.id.is_empty());
    let inner = repo.lock();
    assert_eq!(inner.properties.len(), 1);
    assert_eq!(inner.properties[0].id.as_deref(), Some(created.id.as_str()));
    assert!(inner.properties[0].created_at.is_some());
}

// --- ADMIN PROPERTY TESTS ---

#[test]
async fn test_admin_create_property_success() {
    let (repo, state) = create_test_state();

    let result =
        handlers::admin_create_property(admin_user(), State(state), Json(sample_request())).await;

    assert!(result.is_ok());
    assert_eq!(repo.lock().properties.len(), 1);
}

#[test]
async fn test_admin_create_property_rejects_oversized_document() {
    let (repo, state) = create_test_state();

    let mut payload = sample_request();
    // One base64-ish blob over the 16 MiB store ceiling.
    payload.images = vec!["x".repeat(17 * 1024 * 1024)];

    let result =
        handlers::admin_create_property(admin_user(), State(state), Json(payload)).await;

    assert!(result.is_err());
    let err = result.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(err.to_string().contains("16MB"));
    // Nothing was written.
    assert_eq!(repo.lock().properties.len(), 0);
}

#[test]
async fn test_admin_create_property_accepts_large_but_legal_document() {
    let (repo, state) = create_test_state();

    let mut payload = sample_request();
    // Above the 12 MiB practical ceiling, below the hard limit: warn, accept.
    payload.images = vec!["x".repeat(13 * 1024 * 1024)];

    let result =
        handlers::admin_create_property(admin_user(), State(state), Json(payload)).await;

    assert!(result.is_ok());
    assert_eq!(repo.lock().properties.len(), 1);
}

#[test]
async fn test_admin_update_property_not_found() {
    let (_repo, state) = create_test_state();

    let result = handlers::admin_update_property(
        admin_user(),
        State(state),
        Path("missing".to_string()),
        Json(sample_request()),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(result.unwrap_err().status_code(), StatusCode::NOT_FOUND);
}

#[test]
async fn test_admin_update_property_success() {
    let (repo, state) = create_test_state();
    repo.lock()
        .properties
        .push(sample_property("prop-1", 100_000.0, "İstanbul"));

    let mut payload = sample_request();
    payload.price = 999_000.0;

    let result = handlers::admin_update_property(
        admin_user(),
        State(state),
        Path("prop-1".to_string()),
        Json(payload),
    )
    .await;

    assert!(result.is_ok());
    let inner = repo.lock();
    assert_eq!(inner.properties[0].price, 999_000.0);
    assert!(inner.properties[0].updated_at.is_some());
}

#[test]
async fn test_admin_delete_property() {
    let (repo, state) = create_test_state();
    repo.lock()
        .properties
        .push(sample_property("prop-1", 100_000.0, "İstanbul"));

    let result = handlers::admin_delete_property(
        admin_user(),
        State(state.clone()),
        Path("prop-1".to_string()),
    )
    .await;
    assert!(result.is_ok());
    assert!(repo.lock().properties.is_empty());

    // Deleting again is a 404.
    let result =
        handlers::admin_delete_property(admin_user(), State(state), Path("prop-1".to_string()))
            .await;
    assert_eq!(result.unwrap_err().status_code(), StatusCode::NOT_FOUND);
}

// --- NEWSLETTER TESTS ---

#[test]
async fn test_subscribe_newsletter_success() {
    let (repo, state) = create_test_state();

    let result = handlers::subscribe_newsletter(
        State(state),
        Json(SubscribeRequest {
            email: "reader@example.com".to_string(),
        }),
    )
    .await;

    assert!(result.is_ok());
    let inner = repo.lock();
    assert_eq!(inner.subscriptions.len(), 1);
    assert!(inner.subscriptions[0].subscribed_at.is_some());
}

#[test]
async fn test_subscribe_newsletter_duplicate_conflict() {
    let (repo, state) = create_test_state();
    repo.lock().subscriptions.push(NewsletterSubscription {
        email: "reader@example.com".to_string(),
        subscribed_at: Some(Utc::now()),
    });

    let result = handlers::subscribe_newsletter(
        State(state),
        Json(SubscribeRequest {
            email: "reader@example.com".to_string(),
        }),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(result.unwrap_err().status_code(), StatusCode::CONFLICT);
    assert_eq!(repo.lock().subscriptions.len(), 1);
}

// --- BLOG TESTS ---

#[test]
async fn test_blog_posts_default_limit_is_five() {
    let (repo, state) = create_test_state();

    let result =
        handlers::get_blog_posts(State(state), Query(BlogFilter { limit: None })).await;

    assert!(result.is_ok());
    assert_eq!(repo.lock().last_blog_limit, Some(Some(5)));
}

#[test]
async fn test_blog_posts_explicit_limit_passes_through() {
    let (repo, state) = create_test_state();

    let result =
        handlers::get_blog_posts(State(state), Query(BlogFilter { limit: Some(20) })).await;

    assert!(result.is_ok());
    assert_eq!(repo.lock().last_blog_limit, Some(Some(20)));
}

#[test]
async fn test_blog_posts_newest_first() {
    let (repo, state) = create_test_state();
    {
        let mut inner = repo.lock();
        inner.blog_posts.push(BlogPost {
            id: Some("old".to_string()),
            created_at: Some(Utc::now() - Duration::days(2)),
            ..BlogPost::default()
        });
        inner.blog_posts.push(BlogPost {
            id: Some("new".to_string()),
            created_at: Some(Utc::now()),
            ..BlogPost::default()
        });
    }

    let Json(posts) = handlers::get_blog_posts(State(state), Query(BlogFilter { limit: None }))
        .await
        .unwrap();

    assert_eq!(posts[0].id.as_deref(), Some("new"));
}

// --- LOGO TESTS ---

#[test]
async fn test_get_logo_missing_marker() {
    let (_repo, state) = create_test_state();

    let Json(response) = handlers::get_logo(State(state)).await.unwrap();

    match response {
        LogoResponse::Missing { message } => assert_eq!(message, "No logo found"),
        LogoResponse::Asset { .. } => panic!("expected the missing marker"),
    }
}

#[test]
async fn test_header_logo_falls_back_to_generic() {
    let (repo, state) = create_test_state();
    repo.lock().logos.push(LogoAsset {
        kind: "logo".to_string(),
        logo_base64: "Zm9v".to_string(),
        file_extension: "png".to_string(),
        filename: "logo.png".to_string(),
        uploaded_at: Some(Utc::now()),
    });

    let Json(response) = handlers::get_header_logo(State(state)).await.unwrap();

    match response {
        LogoResponse::Asset { filename, .. } => assert_eq!(filename, "logo.png"),
        LogoResponse::Missing { .. } => panic!("expected the generic logo fallback"),
    }
}

#[test]
async fn test_header_logo_prefers_header_variant() {
    let (repo, state) = create_test_state();
    {
        let mut inner = repo.lock();
        inner.logos.push(LogoAsset {
            kind: "logo".to_string(),
            logo_base64: "Zm9v".to_string(),
            file_extension: "png".to_string(),
            filename: "logo.png".to_string(),
            uploaded_at: Some(Utc::now()),
        });
        inner.logos.push(LogoAsset {
            kind: "header_logo".to_string(),
            logo_base64: "YmFy".to_string(),
            file_extension: "svg".to_string(),
            filename: "header.svg".to_string(),
            uploaded_at: Some(Utc::now()),
        });
    }

    let Json(response) = handlers::get_header_logo(State(state)).await.unwrap();

    match response {
        LogoResponse::Asset { filename, .. } => assert_eq!(filename, "header.svg"),
        LogoResponse::Missing { .. } => panic!("expected the header variant"),
    }
}

// --- AUTH FLOW TESTS ---

fn identity_profile(email: &str, token: &str) -> IdentityProfile {
    IdentityProfile {
        email: email.to_string(),
        name: "Jane Tester".to_string(),
        picture: None,
        session_token: token.to_string(),
    }
}

fn session_headers(session_id: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "X-Session-ID",
        header::HeaderValue::from_str(session_id).unwrap(),
    );
    headers
}

#[test]
async fn test_login_missing_session_header() {
    let (_repo, state) = create_test_state();

    let result = handlers::get_user_profile(State(state), HeaderMap::new()).await;

    assert!(result.is_err());
    assert_eq!(result.unwrap_err().status_code(), StatusCode::BAD_REQUEST);
}

#[test]
async fn test_login_creates_user_and_session() {
    let (repo, state) = create_test_state_with_identity(MockIdentityService::returning(
        identity_profile("jane@example.com", "token-1"),
    ));

    let result = handlers::get_user_profile(State(state), session_headers("sid-1")).await;

    assert!(result.is_ok());
    let Json(auth) = result.unwrap();
    assert_eq!(auth.user.email, "jane@example.com");
    assert!(!auth.user.is_admin);
    assert_eq!(auth.session_token, "token-1");
    assert!(auth.expires_at > Utc::now() + Duration::days(6));

    let inner = repo.lock();
    assert_eq!(inner.users.len(), 1);
    assert_eq!(inner.sessions.len(), 1);
}

#[test]
async fn test_login_twice_leaves_single_session() {
    let (repo, state) = create_test_state_with_identity(MockIdentityService::returning(
        identity_profile("jane@example.com", "token-1"),
    ));

    handlers::get_user_profile(State(state.clone()), session_headers("sid-1"))
        .await
        .unwrap();
    handlers::get_user_profile(State(state), session_headers("sid-2"))
        .await
        .unwrap();

    let inner = repo.lock();
    // One user, and the old session replaced rather than accumulated.
    assert_eq!(inner.users.len(), 1);
    assert_eq!(inner.sessions.len(), 1);
}

#[test]
async fn test_login_allowlisted_email_is_admin() {
    let (_repo, state) = create_test_state_with_identity(MockIdentityService::returning(
        identity_profile("test@admin.com", "token-1"),
    ));

    let Json(auth) = handlers::get_user_profile(State(state), session_headers("sid-1"))
        .await
        .unwrap();

    assert!(auth.user.is_admin);
}

#[test]
async fn test_login_identity_service_unavailable() {
    let (repo, state) = create_test_state_with_identity(MockIdentityService::unavailable());

    let result = handlers::get_user_profile(State(state), session_headers("sid-1")).await;

    assert!(result.is_err());
    assert_eq!(result.unwrap_err().status_code(), StatusCode::UNAUTHORIZED);
    assert!(repo.lock().users.is_empty());
}

#[test]
async fn test_logout_removes_session_and_is_idempotent() {
    let (repo, state) = create_test_state();
    repo.lock().sessions.push(Session {
        id: "s1".to_string(),
        user_id: "u1".to_string(),
        session_token: "token-1".to_string(),
        expires_at: Utc::now() + Duration::days(1),
        created_at: Some(Utc::now()),
    });

    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_static("Bearer token-1"),
    );

    let result = handlers::logout(State(state.clone()), headers.clone()).await;
    assert!(result.is_ok());
    assert!(repo.lock().sessions.is_empty());

    // Second logout with the same (now dead) token still succeeds.
    let result = handlers::logout(State(state.clone()), headers).await;
    assert!(result.is_ok());

    // So does a logout with no token at all.
    let result = handlers::logout(State(state), HeaderMap::new()).await;
    assert!(result.is_ok());
}

#[test]
async fn test_create_test_admin_returns_admin_session() {
    let (repo, state) = create_test_state();

    let result = handlers::create_test_admin(State(state.clone())).await;

    assert!(result.is_ok());
    let Json(auth) = result.unwrap();
    assert_eq!(auth.user.email, "test@admin.com");
    assert!(auth.user.is_admin);
    assert!(auth.session_token.starts_with("test-admin-session-"));
    assert_eq!(repo.lock().sessions.len(), 1);

    // Calling again reuses the user and replaces the session.
    handlers::create_test_admin(State(state)).await.unwrap();
    let inner = repo.lock();
    assert_eq!(inner.users.len(), 1);
    assert_eq!(inner.sessions.len(), 1);
}
