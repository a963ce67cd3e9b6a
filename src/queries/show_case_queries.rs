use std::sync::LazyLock;

use sqlx::PgPool;

use crate::{
    error::Result,
    models::{PageRequest, PublicationStatus, ShowCase},
    queries::media_object,
};

static LIST_SQL: LazyLock<String> = LazyLock::new(|| {
    format!(
        "SELECT s.id, s.document_id, s.locale, s.description, {} AS image,
            COALESCE((
                SELECT jsonb_agg(jsonb_build_object(
                    'id', gm.id, 'url', gm.url, 'alternativeText', gm.alternative_text
                ) ORDER BY g.position)
                FROM show_case_gallery g
                INNER JOIN media gm ON gm.id = g.media_id
                WHERE g.show_case_id = s.id
            ), '[]'::jsonb) AS gallery,
            s.created_at
         FROM show_cases s
         WHERE s.locale = $1 AND ($2 OR s.published_at IS NOT NULL)
         ORDER BY s.created_at DESC, s.id DESC
         LIMIT $3 OFFSET $4",
        media_object("s.image_id")
    )
});

pub async fn list(
    pool: &PgPool,
    locale: &str,
    status: PublicationStatus,
    page: PageRequest,
) -> Result<Vec<ShowCase>> {
    let show_cases = sqlx::query_as::<_, ShowCase>(LIST_SQL.as_str())
        .bind(locale)
        .bind(status.includes_drafts())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    Ok(show_cases)
}

pub async fn count(pool: &PgPool, locale: &str, status: PublicationStatus) -> Result<i64> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM show_cases s
         WHERE s.locale = $1 AND ($2 OR s.published_at IS NOT NULL)",
    )
    .bind(locale)
    .bind(status.includes_drafts())
    .fetch_one(pool)
    .await?;

    Ok(total)
}
