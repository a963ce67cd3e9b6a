pub mod blog_queries;
pub mod category_queries;
pub mod faq_queries;
pub mod inquiry_queries;
pub mod product_queries;
pub mod show_case_queries;
pub mod subscriber_queries;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::Result, models::PublicationStatus, utils::locale::Localization};

impl PublicationStatus {
    /// Bound as `($n OR x.published_at IS NOT NULL)`.
    pub fn includes_drafts(self) -> bool {
        matches!(self, PublicationStatus::Draft)
    }
}

/// `jsonb` object for the media row referenced by `id_column`, or NULL.
pub(crate) fn media_object(id_column: &str) -> String {
    format!(
        "(SELECT jsonb_build_object('id', m.id, 'url', m.url, 'alternativeText', m.alternative_text) \
         FROM media m WHERE m.id = {})",
        id_column
    )
}

/// Tables holding localized, slug-addressed records.
#[derive(Debug, Clone, Copy)]
pub enum LocalizedTable {
    Categories,
    Products,
    Blogs,
}

impl LocalizedTable {
    fn name(self) -> &'static str {
        match self {
            LocalizedTable::Categories => "product_categories",
            LocalizedTable::Products => "products",
            LocalizedTable::Blogs => "blogs",
        }
    }
}

fn localizations_sql(table: LocalizedTable) -> String {
    format!(
        "SELECT locale, slug FROM {} \
         WHERE document_id = $1 AND locale <> $2 AND ($3 OR published_at IS NOT NULL) \
         ORDER BY locale ASC",
        table.name()
    )
}

/// Sibling localizations of a document, excluding `locale` itself.
pub async fn find_localizations(
    pool: &PgPool,
    table: LocalizedTable,
    document_id: Uuid,
    locale: &str,
    status: PublicationStatus,
) -> Result<Vec<Localization>> {
    let localizations = sqlx::query_as::<_, Localization>(&localizations_sql(table))
        .bind(document_id)
        .bind(locale)
        .bind(status.includes_drafts())
        .fetch_all(pool)
        .await?;

    Ok(localizations)
}

/// Every slug of a table in one locale.
pub async fn find_slugs(
    pool: &PgPool,
    table: LocalizedTable,
    locale: &str,
    status: PublicationStatus,
) -> Result<Vec<crate::models::SlugEntry>> {
    let sql = format!(
        "SELECT slug FROM {} WHERE locale = $1 AND ($2 OR published_at IS NOT NULL) \
         ORDER BY slug ASC",
        table.name()
    );

    let slugs = sqlx::query_as::<_, crate::models::SlugEntry>(&sql)
        .bind(locale)
        .bind(status.includes_drafts())
        .fetch_all(pool)
        .await?;

    Ok(slugs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_object_references_the_given_column() {
        let sql = media_object("p.featured_image_id");
        assert!(sql.contains("WHERE m.id = p.featured_image_id"));
        assert!(sql.starts_with('(') && sql.ends_with(')'));
    }

    #[test]
    fn localizations_leave_out_the_requested_locale() {
        let sql = localizations_sql(LocalizedTable::Products);
        assert!(sql.contains("FROM products"));
        assert!(sql.contains("document_id = $1 AND locale <> $2"));
    }

    #[test]
    fn only_draft_status_includes_drafts() {
        assert!(PublicationStatus::Draft.includes_drafts());
        assert!(!PublicationStatus::Published.includes_drafts());
    }
}
