mod blogs;
mod categories;
mod faqs;
mod health;
mod inquiries;
mod products;
mod show_cases;
mod subscribers;

use axum::{
    Router,
    extract::{FromRequestParts, Path, Query},
    routing::{get, post},
};
use sqlx::PgPool;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{PublicationStatus, SeoMetadata, SeoRow},
    queries::{self, LocalizedTable},
    utils::locale::{Localization, locale_slug_map},
};

pub fn create_router() -> Router<AppState> {
    let api = Router::new()
        .route("/categories", get(categories::list_categories))
        .route("/categories/slugs", get(categories::category_slugs))
        .route("/categories/slug-tree", get(categories::category_slug_tree))
        .route("/categories/{slug}", get(categories::get_category))
        .route("/categories/{slug}/metadata", get(categories::category_metadata))
        .route("/categories/{slug}/subtree", get(categories::category_subtree))
        .route("/products/attribute-filters", get(products::attribute_filters))
        .route("/products/filter", post(products::filter_products))
        .route("/products/search", get(products::search_products))
        .route("/products/slugs", get(products::product_slugs))
        .route("/products/{slug}", get(products::get_product))
        .route("/products/{slug}/metadata", get(products::product_metadata))
        .route("/blogs", get(blogs::list_blogs))
        .route("/blogs/slugs", get(blogs::blog_slugs))
        .route("/blogs/{slug}", get(blogs::get_blog))
        .route("/blogs/{slug}/metadata", get(blogs::blog_metadata))
        .route("/faqs/global", get(faqs::global_faqs))
        .route("/faqs/product/{slug}", get(faqs::product_faqs))
        .route("/show-cases", post(show_cases::list_show_cases))
        .route("/inquiries", post(inquiries::submit_inquiry))
        .route("/subscribers", post(subscribers::subscribe));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .nest("/api/v1", api)
}

/// `Query` whose rejection is reported as a JSON [`AppError`].
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub(crate) struct ApiQuery<T>(pub T);

/// `Path` whose rejection is reported as a JSON [`AppError`].
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub(crate) struct ApiPath<T>(pub T);

/// Prefix → slug map for a record and its sibling localizations.
async fn locale_slugs(
    db: &PgPool,
    table: LocalizedTable,
    document_id: Uuid,
    locale: &str,
    slug: &str,
    status: PublicationStatus,
) -> Result<BTreeMap<String, String>> {
    let localizations =
        queries::find_localizations(db, table, document_id, locale, status).await?;

    Ok(locale_slug_map(locale, slug, &localizations))
}

async fn seo_metadata(
    db: &PgPool,
    table: LocalizedTable,
    seo: SeoRow,
    status: PublicationStatus,
) -> Result<SeoMetadata> {
    let localizations =
        queries::find_localizations(db, table, seo.document_id, &seo.locale, status).await?;

    Ok(with_locale_slugs(seo, &localizations))
}

fn with_locale_slugs(seo: SeoRow, localizations: &[Localization]) -> SeoMetadata {
    let locale_slugs = locale_slug_map(&seo.locale, &seo.slug, localizations);
    SeoMetadata { seo, locale_slugs }
}
