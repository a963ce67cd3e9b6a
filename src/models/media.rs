use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Media reference as populated into responses. Built in SQL with
/// `json_build_object`, hence the camelCase wire names on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: i32,
    pub url: String,
    pub alternative_text: Option<String>,
}

/// Publication filter. `Draft` lifts the filter and returns drafts alongside
/// published records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    #[default]
    Published,
    Draft,
}

/// SEO projection shared by categories, products and blogs. Queries alias
/// the record's display name to `title` and its image to `image`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SeoRow {
    #[serde(skip)]
    pub document_id: Uuid,
    pub locale: String,
    pub slug: String,
    pub title: String,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub image: Option<sqlx::types::Json<Media>>,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoMetadata {
    #[serde(flatten)]
    pub seo: SeoRow,
    pub locale_slugs: std::collections::BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SlugEntry {
    pub slug: String,
}
