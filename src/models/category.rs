use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::Media;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i32,
    pub document_id: Uuid,
    pub locale: String,
    pub parent_id: Option<i32>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub sort: i32,
    pub featured_image: Option<Json<Media>>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryLink {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

impl From<&Category> for CategoryLink {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryWithRelations {
    #[serde(flatten)]
    pub category: Category,
    pub parent: Option<CategoryLink>,
    pub children: Vec<CategoryLink>,
}

#[derive(Debug, Serialize)]
pub struct CategorySlugTree {
    pub slug: String,
    pub name: String,
    pub children: Vec<crate::models::SlugEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub locale_slugs: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySubtree {
    pub root: String,
    pub locale: String,
    pub slugs: Vec<String>,
}
