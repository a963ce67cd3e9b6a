use sqlx::PgPool;

use crate::{
    error::Result,
    models::{Faq, PublicationStatus},
};

const FAQ_COLUMNS: &str =
    "f.id, f.document_id, f.locale, f.question, f.answer, f.is_global, f.sort_order, f.created_at";

/// FAQs flagged as global (not tied to a product)
pub async fn find_global(
    pool: &PgPool,
    locale: &str,
    status: PublicationStatus,
) -> Result<Vec<Faq>> {
    let sql = format!(
        "SELECT {} FROM faqs f
         WHERE f.is_global = true AND f.locale = $1 AND ($2 OR f.published_at IS NOT NULL)
         ORDER BY f.sort_order ASC, f.created_at ASC",
        FAQ_COLUMNS
    );

    let faqs = sqlx::query_as::<_, Faq>(&sql)
        .bind(locale)
        .bind(status.includes_drafts())
        .fetch_all(pool)
        .await?;

    Ok(faqs)
}

fn product_faqs_sql() -> String {
    format!(
        "SELECT {} FROM faqs f
         INNER JOIN products p ON p.id = f.product_id
         WHERE f.is_global = false AND p.slug = $1 AND p.locale = $2 AND f.locale = $2
           AND ($3 OR f.published_at IS NOT NULL)
         ORDER BY f.sort_order ASC, f.created_at ASC",
        FAQ_COLUMNS
    )
}

/// Non-global FAQs attached to the product with `product_slug`
pub async fn find_by_product_slug(
    pool: &PgPool,
    product_slug: &str,
    locale: &str,
    status: PublicationStatus,
) -> Result<Vec<Faq>> {
    let faqs = sqlx::query_as::<_, Faq>(&product_faqs_sql())
        .bind(product_slug)
        .bind(locale)
        .bind(status.includes_drafts())
        .fetch_all(pool)
        .await?;

    Ok(faqs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_lookup_is_scoped_to_the_locale() {
        let sql = product_faqs_sql();
        assert!(sql.contains("p.slug = $1 AND p.locale = $2"));
        assert!(sql.contains("f.locale = $2"));
    }
}
