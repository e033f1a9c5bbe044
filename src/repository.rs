use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    AboutContent, BlogPost, FooterContent, LogoAsset, NewsletterSubscription, Property,
    PropertyFilter, PropertyRequest, SearchFilter, Session, User,
};
use async_trait::async_trait;
use bson::{Document, doc, oid::ObjectId};
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::{Client, Database, IndexModel, options::IndexOptions};
use std::sync::Arc;

/// Repository Trait
///
/// The abstract contract for all persistence operations, one method per
/// document-store query or mutation the API performs. Handlers depend on
/// this trait rather than the MongoDB driver, so tests swap in an in-memory
/// implementation and the whole HTTP layer runs without a database.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Properties ---
    async fn list_properties(&self, filter: &PropertyFilter) -> ApiResult<Vec<Property>>;
    /// Dual-interpretation lookup: a value that parses as a native ObjectId
    /// is resolved against `_id` only; anything else against the
    /// application `id` field. The order is load-bearing for existing
    /// front-end links and must not change.
    async fn get_property(&self, property_id: &str) -> ApiResult<Option<Property>>;
    async fn search_properties(&self, filter: &SearchFilter) -> ApiResult<Vec<Property>>;
    async fn insert_property(&self, property: Property) -> ApiResult<()>;
    /// Replaces the mutable fields of the property matching the application
    /// id, stamping `updated_at`. Returns false when nothing matched.
    async fn update_property(&self, property_id: &str, req: &PropertyRequest) -> ApiResult<bool>;
    /// Removes by application id. Returns false when nothing was removed.
    async fn delete_property(&self, property_id: &str) -> ApiResult<bool>;
    async fn count_properties(&self) -> ApiResult<u64>;
    async fn insert_properties(&self, properties: Vec<Property>) -> ApiResult<()>;

    // --- Singleton content ---
    async fn get_about(&self) -> ApiResult<Option<AboutContent>>;
    async fn put_about(&self, content: AboutContent) -> ApiResult<()>;
    async fn get_footer(&self) -> ApiResult<Option<FooterContent>>;
    async fn put_footer(&self, content: FooterContent) -> ApiResult<()>;

    // --- Newsletter ---
    async fn find_subscription(&self, email: &str) -> ApiResult<Option<NewsletterSubscription>>;
    async fn insert_subscription(&self, subscription: NewsletterSubscription) -> ApiResult<()>;

    // --- Blog ---
    async fn list_blog_posts(&self, limit: Option<i64>) -> ApiResult<Vec<BlogPost>>;
    async fn insert_blog_post(&self, post: BlogPost) -> ApiResult<()>;
    async fn count_blog_posts(&self) -> ApiResult<u64>;
    async fn insert_blog_posts(&self, posts: Vec<BlogPost>) -> ApiResult<()>;

    // --- Users ---
    async fn find_user_by_email(&self, email: &str) -> ApiResult<Option<User>>;
    async fn find_user_by_id(&self, user_id: &str) -> ApiResult<Option<User>>;
    async fn insert_user(&self, user: User) -> ApiResult<()>;

    // --- Sessions ---
    /// Looks up the session for a token and applies the expiry check:
    /// only a session whose `expires_at` is strictly in the future counts.
    async fn find_valid_session(&self, token: &str) -> ApiResult<Option<Session>>;
    async fn insert_session(&self, session: Session) -> ApiResult<()>;
    /// Invalidate-all-for-user, run before inserting a replacement session.
    async fn delete_sessions_for_user(&self, user_id: &str) -> ApiResult<u64>;
    async fn delete_session_by_token(&self, token: &str) -> ApiResult<u64>;

    // --- Logo assets ---
    async fn get_logo(&self, kind: &str) -> ApiResult<Option<LogoAsset>>;
    async fn put_logo(&self, asset: LogoAsset) -> ApiResult<()>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// MongoRepository
///
/// The concrete implementation of [`Repository`] backed by MongoDB. Each
/// method is a single collection-scoped operation; the store's per-document
/// atomicity is the only consistency unit the API relies on.
pub struct MongoRepository {
    db: Database,
}

const PROPERTIES: &str = "properties";
const ABOUT_CONTENT: &str = "about_content";
const FOOTER_CONTENT: &str = "footer_content";
const NEWSLETTER: &str = "newsletter";
const BLOG_POSTS: &str = "blog_posts";
const USERS: &str = "users";
const USER_SESSIONS: &str = "user_sessions";
const SITE_SETTINGS: &str = "site_settings";

impl MongoRepository {
    /// Connects to MongoDB and verifies the connection with a ping.
    /// Short server-selection and connect timeouts keep startup from hanging
    /// on an unreachable database.
    pub async fn connect(config: &AppConfig) -> ApiResult<Self> {
        let uri = if config.mongo_url.contains('?') {
            format!(
                "{}&serverSelectionTimeoutMS=3000&connectTimeoutMS=3000",
                config.mongo_url
            )
        } else {
            format!(
                "{}?serverSelectionTimeoutMS=3000&connectTimeoutMS=3000",
                config.mongo_url
            )
        };

        let client = Client::with_uri_str(&uri)
            .await
            .map_err(|e| ApiError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        let db = client.database(&config.db_name);
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| ApiError::Database(format!("MongoDB ping failed: {}", e)))?;

        tracing::info!(db = %config.db_name, "connected to MongoDB");

        Ok(Self { db })
    }

    /// Applies the uniqueness indexes the API logic assumes: one newsletter
    /// row per email, one user per email, and token lookups on sessions.
    /// Idempotent; safe to run on every startup.
    pub async fn ensure_indexes(&self) -> ApiResult<()> {
        let unique = |name: &str| {
            IndexOptions::builder()
                .unique(true)
                .name(name.to_string())
                .build()
        };

        self.db
            .collection::<NewsletterSubscription>(NEWSLETTER)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique("newsletter_email_unique"))
                    .build(),
            )
            .await?;

        self.db
            .collection::<User>(USERS)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique("user_email_unique"))
                    .build(),
            )
            .await?;

        self.db
            .collection::<Session>(USER_SESSIONS)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "session_token": 1 })
                    .options(
                        IndexOptions::builder()
                            .name("session_token_index".to_string())
                            .build(),
                    )
                    .build(),
            )
            .await?;

        self.db
            .collection::<Property>(PROPERTIES)
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "id": 1 })
                    .options(
                        IndexOptions::builder()
                            .name("property_app_id_index".to_string())
                            .build(),
                    )
                    .build(),
            )
            .await?;

        Ok(())
    }
}

#[async_trait]
impl Repository for MongoRepository {
    async fn list_properties(&self, filter: &PropertyFilter) -> ApiResult<Vec<Property>> {
        let mut query = Document::new();
        if let Some(featured) = filter.featured {
            query.insert("featured", featured);
        }
        if let Some(status) = &filter.status {
            query.insert("status", status.as_str());
        }

        let collection = self.db.collection::<Property>(PROPERTIES);
        let mut find = collection.find(query);
        if let Some(limit) = filter.limit {
            find = find.limit(limit);
        }

        let properties: Vec<Property> = find.await?.try_collect().await?;
        Ok(properties
            .into_iter()
            .map(Property::ensure_public_id)
            .collect())
    }

    async fn get_property(&self, property_id: &str) -> ApiResult<Option<Property>> {
        let collection = self.db.collection::<Property>(PROPERTIES);

        // Native-id interpretation wins when the value parses as an ObjectId.
        // Application UUIDs never do, so the two cases cannot shadow each other.
        let found = match ObjectId::parse_str(property_id) {
            Ok(oid) => collection.find_one(doc! { "_id": oid }).await?,
            Err(_) => collection.find_one(doc! { "id": property_id }).await?,
        };

        Ok(found.map(Property::ensure_public_id))
    }

    async fn search_properties(&self, filter: &SearchFilter) -> ApiResult<Vec<Property>> {
        let mut query = Document::new();

        if let Some(location) = &filter.location {
            query.insert("location", doc! { "$regex": location, "$options": "i" });
        }

        let mut price = Document::new();
        if let Some(min) = filter.min_price {
            price.insert("$gte", min);
        }
        if let Some(max) = filter.max_price {
            price.insert("$lte", max);
        }
        if !price.is_empty() {
            query.insert("price", price);
        }

        if let Some(property_type) = &filter.property_type {
            query.insert("property_type", property_type.as_str());
        }
        if let Some(bedrooms) = filter.bedrooms {
            query.insert("bedrooms", bedrooms);
        }

        let properties: Vec<Property> = self
            .db
            .collection::<Property>(PROPERTIES)
            .find(query)
            .await?
            .try_collect()
            .await?;

        Ok(properties
            .into_iter()
            .map(Property::ensure_public_id)
            .collect())
    }

    async fn insert_property(&self, property: Property) -> ApiResult<()> {
        self.db
            .collection::<Property>(PROPERTIES)
            .insert_one(property)
            .await?;
        Ok(())
    }

    async fn update_property(&self, property_id: &str, req: &PropertyRequest) -> ApiResult<bool> {
        let mut update = bson::to_document(req)?;
        update.insert("updated_at", bson::to_bson(&Utc::now())?);

        let result = self
            .db
            .collection::<Property>(PROPERTIES)
            .update_one(doc! { "id": property_id }, doc! { "$set": update })
            .await?;

        Ok(result.matched_count > 0)
    }

    async fn delete_property(&self, property_id: &str) -> ApiResult<bool> {
        let result = self
            .db
            .collection::<Property>(PROPERTIES)
            .delete_one(doc! { "id": property_id })
            .await?;
        Ok(result.deleted_count > 0)
    }

    async fn count_properties(&self) -> ApiResult<u64> {
        Ok(self
            .db
            .collection::<Property>(PROPERTIES)
            .count_documents(doc! {})
            .await?)
    }

    async fn insert_properties(&self, properties: Vec<Property>) -> ApiResult<()> {
        self.db
            .collection::<Property>(PROPERTIES)
            .insert_many(properties)
            .await?;
        Ok(())
    }

    async fn get_about(&self) -> ApiResult<Option<AboutContent>> {
        let content = self
            .db
            .collection::<AboutContent>(ABOUT_CONTENT)
            .find_one(doc! {})
            .await?;
        Ok(content.map(AboutContent::ensure_public_id))
    }

    async fn put_about(&self, content: AboutContent) -> ApiResult<()> {
        // Whole-document replace against the empty filter: the collection
        // holds at most one row, last writer wins.
        self.db
            .collection::<AboutContent>(ABOUT_CONTENT)
            .replace_one(doc! {}, content)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn get_footer(&self) -> ApiResult<Option<FooterContent>> {
        let content = self
            .db
            .collection::<FooterContent>(FOOTER_CONTENT)
            .find_one(doc! {})
            .await?;
        Ok(content.map(FooterContent::ensure_public_id))
    }

    async fn put_footer(&self, content: FooterContent) -> ApiResult<()> {
        self.db
            .collection::<FooterContent>(FOOTER_CONTENT)
            .replace_one(doc! {}, content)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn find_subscription(&self, email: &str) -> ApiResult<Option<NewsletterSubscription>> {
        Ok(self
            .db
            .collection::<NewsletterSubscription>(NEWSLETTER)
            .find_one(doc! { "email": email })
            .await?)
    }

    async fn insert_subscription(&self, subscription: NewsletterSubscription) -> ApiResult<()> {
        self.db
            .collection::<NewsletterSubscription>(NEWSLETTER)
            .insert_one(subscription)
            .await?;
        Ok(())
    }

    async fn list_blog_posts(&self, limit: Option<i64>) -> ApiResult<Vec<BlogPost>> {
        let collection = self.db.collection::<BlogPost>(BLOG_POSTS);
        let mut find = collection.find(doc! {}).sort(doc! { "created_at": -1 });
        if let Some(limit) = limit {
            find = find.limit(limit);
        }

        let posts: Vec<BlogPost> = find.await?.try_collect().await?;
        Ok(posts.into_iter().map(BlogPost::ensure_public_id).collect())
    }

    async fn insert_blog_post(&self, post: BlogPost) -> ApiResult<()> {
        self.db
            .collection::<BlogPost>(BLOG_POSTS)
            .insert_one(post)
            .await?;
        Ok(())
    }

    async fn count_blog_posts(&self) -> ApiResult<u64> {
        Ok(self
            .db
            .collection::<BlogPost>(BLOG_POSTS)
            .count_documents(doc! {})
            .await?)
    }

    async fn insert_blog_posts(&self, posts: Vec<BlogPost>) -> ApiResult<()> {
        self.db
            .collection::<BlogPost>(BLOG_POSTS)
            .insert_many(posts)
            .await?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        Ok(self
            .db
            .collection::<User>(USERS)
            .find_one(doc! { "email": email })
            .await?)
    }

    async fn find_user_by_id(&self, user_id: &str) -> ApiResult<Option<User>> {
        Ok(self
            .db
            .collection::<User>(USERS)
            .find_one(doc! { "id": user_id })
            .await?)
    }

    async fn insert_user(&self, user: User) -> ApiResult<()> {
        self.db.collection::<User>(USERS).insert_one(user).await?;
        Ok(())
    }

    async fn find_valid_session(&self, token: &str) -> ApiResult<Option<Session>> {
        // Timestamps are stored in their serialized form, so the expiry
        // comparison happens here rather than in the store query. Expired
        // rows stay behind and simply never match.
        let session = self
            .db
            .collection::<Session>(USER_SESSIONS)
            .find_one(doc! { "session_token": token })
            .await?;

        Ok(session.filter(|s| s.expires_at > Utc::now()))
    }

    async fn insert_session(&self, session: Session) -> ApiResult<()> {
        self.db
            .collection::<Session>(USER_SESSIONS)
            .insert_one(session)
            .await?;
        Ok(())
    }

    async fn delete_sessions_for_user(&self, user_id: &str) -> ApiResult<u64> {
        let result = self
            .db
            .collection::<Session>(USER_SESSIONS)
            .delete_many(doc! { "user_id": user_id })
            .await?;
        Ok(result.deleted_count)
    }

    async fn delete_session_by_token(&self, token: &str) -> ApiResult<u64> {
        let result = self
            .db
            .collection::<Session>(USER_SESSIONS)
            .delete_one(doc! { "session_token": token })
            .await?;
        Ok(result.deleted_count)
    }

    async fn get_logo(&self, kind: &str) -> ApiResult<Option<LogoAsset>> {
        Ok(self
            .db
            .collection::<LogoAsset>(SITE_SETTINGS)
            .find_one(doc! { "type": kind })
            .await?)
    }

    async fn put_logo(&self, asset: LogoAsset) -> ApiResult<()> {
        let filter = doc! { "type": asset.kind.as_str() };
        self.db
            .collection::<LogoAsset>(SITE_SETTINGS)
            .replace_one(filter, asset)
            .upsert(true)
            .await?;
        Ok(())
    }
}
