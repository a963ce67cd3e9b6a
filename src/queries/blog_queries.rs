use std::sync::LazyLock;

use sqlx::PgPool;

use crate::{
    error::Result,
    models::{BlogRecord, BlogSummary, PageRequest, PublicationStatus, SeoRow},
    queries::media_object,
};

static SUMMARY_COLUMNS: LazyLock<String> = LazyLock::new(|| {
    format!(
        "b.id, b.document_id, b.locale, b.title, b.slug, b.excerpt, {} AS cover_image, \
         b.published_at, b.created_at",
        media_object("b.cover_image_id")
    )
});

pub async fn list(
    pool: &PgPool,
    locale: &str,
    status: PublicationStatus,
    page: PageRequest,
) -> Result<Vec<BlogSummary>> {
    let sql = format!(
        "SELECT {} FROM blogs b
         WHERE b.locale = $1 AND ($2 OR b.published_at IS NOT NULL)
         ORDER BY b.created_at DESC, b.id DESC
         LIMIT $3 OFFSET $4",
        *SUMMARY_COLUMNS
    );

    let blogs = sqlx::query_as::<_, BlogSummary>(&sql)
        .bind(locale)
        .bind(status.includes_drafts())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    Ok(blogs)
}

/// Same scope as [`list`].
pub async fn count(pool: &PgPool, locale: &str, status: PublicationStatus) -> Result<i64> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM blogs b
         WHERE b.locale = $1 AND ($2 OR b.published_at IS NOT NULL)",
    )
    .bind(locale)
    .bind(status.includes_drafts())
    .fetch_one(pool)
    .await?;

    Ok(total)
}

pub async fn find_by_slug(
    pool: &PgPool,
    slug: &str,
    locale: &str,
    status: PublicationStatus,
) -> Result<Option<BlogRecord>> {
    let sql = format!(
        "SELECT {summary}, b.content, b.seo_title, b.seo_description, b.updated_at,
            COALESCE((
                SELECT jsonb_agg(jsonb_build_object(
                    'id', r.id, 'title', r.title, 'slug', r.slug, 'excerpt', r.excerpt,
                    'coverImage', {related_image}
                ) ORDER BY br.position)
                FROM blog_related br
                INNER JOIN blogs r ON r.id = br.related_id
                WHERE br.blog_id = b.id AND ($3 OR r.published_at IS NOT NULL)
            ), '[]'::jsonb) AS related_blogs
         FROM blogs b
         WHERE b.slug = $1 AND b.locale = $2 AND ($3 OR b.published_at IS NOT NULL)",
        summary = *SUMMARY_COLUMNS,
        related_image = media_object("r.cover_image_id"),
    );

    let blog = sqlx::query_as::<_, BlogRecord>(&sql)
        .bind(slug)
        .bind(locale)
        .bind(status.includes_drafts())
        .fetch_optional(pool)
        .await?;

    Ok(blog)
}

pub async fn find_seo_by_slug(
    pool: &PgPool,
    slug: &str,
    locale: &str,
    status: PublicationStatus,
) -> Result<Option<SeoRow>> {
    let sql = format!(
        "SELECT b.document_id, b.locale, b.slug, b.title, b.seo_title, b.seo_description,
                {} AS image, b.published_at, b.updated_at
         FROM blogs b
         WHERE b.slug = $1 AND b.locale = $2 AND ($3 OR b.published_at IS NOT NULL)",
        media_object("b.cover_image_id")
    );

    let seo = sqlx::query_as::<_, SeoRow>(&sql)
        .bind(slug)
        .bind(locale)
        .bind(status.includes_drafts())
        .fetch_optional(pool)
        .await?;

    Ok(seo)
}
