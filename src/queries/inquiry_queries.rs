use sqlx::PgPool;

use crate::{
    error::Result,
    models::{Inquiry, InquiryAttachment, NewInquiry},
};

pub async fn create_inquiry(pool: &PgPool, inquiry: &NewInquiry) -> Result<Inquiry> {
    let inquiry = sqlx::query_as::<_, Inquiry>(
        "INSERT INTO inquiries (name, email, phone, company, position, message)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING *",
    )
    .bind(&inquiry.name)
    .bind(&inquiry.email)
    .bind(&inquiry.phone)
    .bind(&inquiry.company)
    .bind(&inquiry.position)
    .bind(&inquiry.message)
    .fetch_one(pool)
    .await?;

    Ok(inquiry)
}

pub async fn add_attachment(
    pool: &PgPool,
    inquiry_id: i32,
    file_name: &str,
    content_type: &str,
    size: i64,
) -> Result<InquiryAttachment> {
    let attachment = sqlx::query_as::<_, InquiryAttachment>(
        "INSERT INTO inquiry_attachments (inquiry_id, file_name, content_type, size)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(inquiry_id)
    .bind(file_name)
    .bind(content_type)
    .bind(size)
    .fetch_one(pool)
    .await?;

    Ok(attachment)
}
