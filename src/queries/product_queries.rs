use std::sync::LazyLock;

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    error::Result,
    models::{
        PageRequest, ProductAttributes, ProductFilter, ProductRecord, ProductSort,
        ProductSummary, PublicationStatus, SeoRow,
    },
    queries::media_object,
};

const SIMILARITY_THRESHOLD: f64 = 0.3;

const PRODUCT_FROM: &str =
    " FROM products p LEFT JOIN product_categories c ON c.id = p.category_id";

const ATTRIBUTE_COLUMNS: &str = "p.length, p.width, p.material, p.finish, p.grade, \
     p.working_load_limit, p.assembly_break_strength, p.webbing_break_strength, \
     p.end_fitting, p.fixed_end_length, p.ratchet_handle, p.product_weight";

static SUMMARY_COLUMNS: LazyLock<String> = LazyLock::new(|| {
    format!(
        "p.id, p.document_id, p.locale, p.name, p.slug, p.short_description, p.price, \
         {} AS featured_image, \
         CASE WHEN c.id IS NULL THEN NULL \
              ELSE jsonb_build_object('id', c.id, 'name', c.name, 'slug', c.slug) END AS category, \
         {}, p.published_at, p.created_at",
        media_object("p.featured_image_id"),
        ATTRIBUTE_COLUMNS
    )
});

static DETAIL_SQL: LazyLock<String> = LazyLock::new(|| {
    format!(
        "SELECT {summary}, p.content, p.seo_title, p.seo_description, p.updated_at,
            COALESCE((
                SELECT jsonb_agg(jsonb_build_object(
                    'id', gm.id, 'url', gm.url, 'alternativeText', gm.alternative_text
                ) ORDER BY g.position)
                FROM product_gallery g
                INNER JOIN media gm ON gm.id = g.media_id
                WHERE g.product_id = p.id
            ), '[]'::jsonb) AS gallery,
            COALESCE((
                SELECT jsonb_agg(jsonb_build_object(
                    'id', r.id, 'name', r.name, 'slug', r.slug,
                    'featuredImage', {related_image}
                ) ORDER BY pr.position)
                FROM product_related pr
                INNER JOIN products r ON r.id = pr.related_id
                WHERE pr.product_id = p.id AND ($3 OR r.published_at IS NOT NULL)
            ), '[]'::jsonb) AS related_products
         {from}
         WHERE p.slug = $1 AND p.locale = $2 AND ($3 OR p.published_at IS NOT NULL)",
        summary = *SUMMARY_COLUMNS,
        related_image = media_object("r.featured_image_id"),
        from = PRODUCT_FROM,
    )
});

/// Escape `LIKE` wildcards so a search term only matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Append the WHERE clause for `filter`. List and count queries both go
/// through here so their totals always agree.
fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter) {
    query.push(" WHERE p.locale = ");
    query.push_bind(filter.locale.clone());

    query.push(" AND (");
    query.push_bind(filter.status.includes_drafts());
    query.push(" OR p.published_at IS NOT NULL)");

    if let Some(ref slugs) = filter.category_slugs {
        query.push(" AND c.slug = ANY(");
        query.push_bind(slugs.clone());
        query.push(")");
    }

    for (attribute, value) in &filter.attributes {
        query.push(" AND p.");
        query.push(attribute.column());
        query.push(" = ");
        query.push_bind(value.clone());
    }

    if let Some(ref q) = filter.search {
        let pattern = format!("%{}%", escape_like(q));
        query.push(" AND (p.name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR p.short_description ILIKE ");
        query.push_bind(pattern);
        query.push(" OR similarity(p.name, ");
        query.push_bind(q.clone());
        query.push(") > ");
        query.push_bind(SIMILARITY_THRESHOLD);
        query.push(")");
    }
}

fn push_order(query: &mut QueryBuilder<'_, Postgres>, filter: &ProductFilter, sort: ProductSort) {
    query.push(" ORDER BY ");

    if let Some(ref q) = filter.search {
        query.push("similarity(p.name, ");
        query.push_bind(q.clone());
        query.push(") DESC, ");
    }

    query.push(sort.order_by());
}

pub async fn list(
    pool: &PgPool,
    filter: &ProductFilter,
    sort: ProductSort,
    page: PageRequest,
) -> Result<Vec<ProductSummary>> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
    query.push(SUMMARY_COLUMNS.as_str());
    query.push(PRODUCT_FROM);
    push_filter(&mut query, filter);
    push_order(&mut query, filter, sort);

    query.push(" LIMIT ");
    query.push_bind(page.limit());
    query.push(" OFFSET ");
    query.push_bind(page.offset());

    let products = query
        .build_query_as::<ProductSummary>()
        .fetch_all(pool)
        .await?;

    Ok(products)
}

pub async fn count(pool: &PgPool, filter: &ProductFilter) -> Result<i64> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*)");
    query.push(PRODUCT_FROM);
    push_filter(&mut query, filter);

    let total = query.build_query_scalar::<i64>().fetch_one(pool).await?;

    Ok(total)
}

/// Attribute columns of every product matching `filter`.
pub async fn find_attributes(
    pool: &PgPool,
    filter: &ProductFilter,
) -> Result<Vec<ProductAttributes>> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
    query.push(ATTRIBUTE_COLUMNS);
    query.push(PRODUCT_FROM);
    push_filter(&mut query, filter);

    let rows = query
        .build_query_as::<ProductAttributes>()
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

pub async fn find_by_slug(
    pool: &PgPool,
    slug: &str,
    locale: &str,
    status: PublicationStatus,
) -> Result<Option<ProductRecord>> {
    let product = sqlx::query_as::<_, ProductRecord>(DETAIL_SQL.as_str())
        .bind(slug)
        .bind(locale)
        .bind(status.includes_drafts())
        .fetch_optional(pool)
        .await?;

    Ok(product)
}

pub async fn find_seo_by_slug(
    pool: &PgPool,
    slug: &str,
    locale: &str,
    status: PublicationStatus,
) -> Result<Option<SeoRow>> {
    let sql = format!(
        "SELECT p.document_id, p.locale, p.slug, p.name AS title, p.seo_title, p.seo_description,
                {} AS image, p.published_at, p.updated_at
         FROM products p
         WHERE p.slug = $1 AND p.locale = $2 AND ($3 OR p.published_at IS NOT NULL)",
        media_object("p.featured_image_id")
    );

    let seo = sqlx::query_as::<_, SeoRow>(&sql)
        .bind(slug)
        .bind(locale)
        .bind(status.includes_drafts())
        .fetch_optional(pool)
        .await?;

    Ok(seo)
}
