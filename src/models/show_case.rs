use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use crate::models::{Media, PublicationStatus};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShowCase {
    pub id: i32,
    pub document_id: Uuid,
    pub locale: String,
    pub description: Option<String>,
    pub image: Option<Json<Media>>,
    pub gallery: Json<Vec<Media>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowCaseListRequest {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub locale: Option<String>,
    #[serde(default)]
    pub status: PublicationStatus,
}
