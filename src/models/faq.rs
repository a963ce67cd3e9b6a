use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    pub id: i32,
    pub document_id: Uuid,
    pub locale: String,
    pub question: String,
    /// Rich-text blocks, passed through untouched.
    pub answer: serde_json::Value,
    pub is_global: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}
