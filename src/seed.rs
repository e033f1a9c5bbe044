use chrono::Utc;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::models::{BlogPost, Property};
use crate::repository::RepositoryState;

/// initialize_sample_data
///
/// Startup seeder: the first time the service runs against an empty store it
/// inserts a couple of showcase properties and blog posts so the site is not
/// blank before an admin has entered real content. Counts are checked per
/// collection, so a store with real data is never touched.
pub async fn initialize_sample_data(repo: &RepositoryState) -> ApiResult<()> {
    if repo.count_properties().await? == 0 {
        repo.insert_properties(sample_properties()).await?;
        tracing::info!("seeded sample properties");
    }

    if repo.count_blog_posts().await? == 0 {
        repo.insert_blog_posts(sample_blog_posts()).await?;
        tracing::info!("seeded sample blog posts");
    }

    Ok(())
}

fn sample_properties() -> Vec<Property> {
    vec![
        Property {
            id: Some(Uuid::new_v4().to_string()),
            title_tr: "Lüks Villa".to_string(),
            title_en: "Luxury Villa".to_string(),
            description_tr: "Modern tasarımı ve geniş bahçesi ile muhteşem villa".to_string(),
            description_en: "Magnificent villa with modern design and large garden".to_string(),
            price: 850_000.0,
            location: "İstanbul, Beşiktaş".to_string(),
            bedrooms: 4,
            bathrooms: 3,
            size: 250.0,
            property_type: "Villa".to_string(),
            image_url: "https://images.unsplash.com/photo-1613490493576-7fde63acd811?crop=entropy&cs=srgb&fm=jpg&q=85".to_string(),
            featured: true,
            status: "sale".to_string(),
            created_at: Some(Utc::now()),
            ..Property::default()
        },
        Property {
            id: Some(Uuid::new_v4().to_string()),
            title_tr: "Modern Konut".to_string(),
            title_en: "Modern Residence".to_string(),
            description_tr: "Şehir merkezinde konforlu yaşam alanı".to_string(),
            description_en: "Comfortable living space in the city center".to_string(),
            price: 450_000.0,
            location: "Ankara, Çankaya".to_string(),
            bedrooms: 3,
            bathrooms: 2,
            size: 180.0,
            property_type: "Apartment".to_string(),
            image_url: "https://images.unsplash.com/photo-1706808849780-7a04fbac83ef?crop=entropy&cs=srgb&fm=jpg&q=85".to_string(),
            featured: true,
            status: "sale".to_string(),
            created_at: Some(Utc::now()),
            ..Property::default()
        },
    ]
}

fn sample_blog_posts() -> Vec<BlogPost> {
    vec![
        BlogPost {
            native_id: None,
            id: Some(Uuid::new_v4().to_string()),
            title_tr: "2024 Gayrimenkul Trendleri".to_string(),
            title_en: "2024 Real Estate Trends".to_string(),
            content_tr: "Bu yıl gayrimenkul sektöründe öne çıkan trendler...".to_string(),
            content_en: "This year's prominent trends in the real estate sector...".to_string(),
            created_at: Some(Utc::now()),
        },
        BlogPost {
            native_id: None,
            id: Some(Uuid::new_v4().to_string()),
            title_tr: "Yatırım İpuçları".to_string(),
            title_en: "Investment Tips".to_string(),
            content_tr: "Gayrimenkul yatırımında dikkat edilmesi gerekenler...".to_string(),
            content_en: "What to pay attention to in real estate investment...".to_string(),
            created_at: Some(Utc::now()),
        },
    ]
}
