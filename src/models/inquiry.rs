use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub message: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InquiryAttachment {
    pub id: i32,
    pub inquiry_id: i32,
    pub file_name: String,
    pub content_type: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InquiryWithAttachments {
    #[serde(flatten)]
    pub inquiry: Inquiry,
    pub attachments: Vec<InquiryAttachment>,
}

/// Validated inquiry ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInquiry {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub message: serde_json::Value,
}

/// Raw form fields as submitted. Everything is optional until validated.
#[derive(Debug, Clone, Default)]
pub struct InquiryForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub position: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InquiryResponse {
    pub message: &'static str,
    pub inquiry: InquiryWithAttachments,
}
