use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::{AppError, Result},
    models::{InquiryWithAttachments, NewInquiry, PublicationStatus, Subscriber},
    queries::{category_queries, inquiry_queries, subscriber_queries},
    services::upload_service::StoredUpload,
};

/// Record-store operations the handlers with real logic depend on. Injected
/// through `AppState` so those handlers can run against a fake.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn child_category_slugs(
        &self,
        parent_slug: &str,
        locale: &str,
        status: PublicationStatus,
    ) -> Result<Vec<String>>;

    async fn find_subscriber(&self, email: &str) -> Result<Option<Subscriber>>;

    /// Fails with [`AppError::Conflict`] when the email already exists.
    async fn create_subscriber(&self, email: &str) -> Result<Subscriber>;

    async fn create_inquiry(
        &self,
        inquiry: &NewInquiry,
        attachments: &[StoredUpload],
    ) -> Result<InquiryWithAttachments>;
}

#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn child_category_slugs(
        &self,
        parent_slug: &str,
        locale: &str,
        status: PublicationStatus,
    ) -> Result<Vec<String>> {
        category_queries::find_child_slugs(&self.pool, parent_slug, locale, status).await
    }

    async fn find_subscriber(&self, email: &str) -> Result<Option<Subscriber>> {
        subscriber_queries::find_by_email(&self.pool, email).await
    }

    async fn create_subscriber(&self, email: &str) -> Result<Subscriber> {
        subscriber_queries::create(&self.pool, email)
            .await
            .map_err(|e| match e {
                AppError::DatabaseError(sqlx::Error::Database(ref db))
                    if db.is_unique_violation() =>
                {
                    AppError::Conflict(format!("Subscriber {} already exists", email))
                }
                other => other,
            })
    }

    async fn create_inquiry(
        &self,
        inquiry: &NewInquiry,
        attachments: &[StoredUpload],
    ) -> Result<InquiryWithAttachments> {
        let record = inquiry_queries::create_inquiry(&self.pool, inquiry).await?;

        let mut stored = Vec::with_capacity(attachments.len());
        for upload in attachments {
            let attachment = inquiry_queries::add_attachment(
                &self.pool,
                record.id,
                &upload.original_name,
                &upload.content_type,
                upload.size as i64,
            )
            .await?;
            stored.push(attachment);
        }

        Ok(InquiryWithAttachments {
            inquiry: record,
            attachments: stored,
        })
    }
}
