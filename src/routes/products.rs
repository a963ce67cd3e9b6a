use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{
        AttributeFilterCounts, AttributeFiltersQuery, DataResponse, FilterProductsRequest,
        PageRequest, Paginated, ProductDetail, ProductFilter, ProductSearchQuery, ProductSort,
        ProductSummary, PublicationStatus, SeoMetadata, SlugEntry, count_attribute_values,
    },
    queries::{LocalizedTable, find_slugs, product_queries},
    services::category_service,
    utils::locale::{LocaleQuery, resolve_request_locale},
};

use super::{ApiPath, ApiQuery, locale_slugs, seo_metadata};

const DEFAULT_PAGE_SIZE: i64 = 10;
const SEARCH_PAGE_SIZE: i64 = 8;

/// Expand an optional category slug into the slugs of its whole subtree.
async fn category_scope(
    state: &AppState,
    category_slug: Option<&str>,
    locale: &str,
    status: PublicationStatus,
) -> Result<Option<Vec<String>>> {
    match category_slug.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => {
            let slugs =
                category_service::resolve_subtree(state.store.as_ref(), slug, locale, status)
                    .await?;
            Ok(Some(slugs))
        }
        None => Ok(None),
    }
}

pub async fn attribute_filters(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<AttributeFiltersQuery>,
) -> Result<Json<DataResponse<AttributeFilterCounts>>> {
    let locale = resolve_request_locale(params.locale.as_deref());
    let category_slugs =
        category_scope(&state, params.category_slug.as_deref(), &locale, params.status).await?;

    let filter = ProductFilter {
        locale,
        status: params.status,
        category_slugs,
        ..Default::default()
    };

    let products = product_queries::find_attributes(&state.db, &filter).await?;

    Ok(Json(DataResponse::new(count_attribute_values(&products))))
}

pub async fn filter_products(
    State(state): State<AppState>,
    payload: std::result::Result<Json<FilterProductsRequest>, JsonRejection>,
) -> Result<Json<Paginated<ProductSummary>>> {
    let Json(req) = payload?;

    let page = PageRequest::new(req.page, req.page_size, DEFAULT_PAGE_SIZE);
    let locale = resolve_request_locale(req.locale.as_deref());
    let category_slugs =
        category_scope(&state, req.category_slug.as_deref(), &locale, req.status).await?;

    let filter = ProductFilter {
        locale,
        status: req.status,
        category_slugs,
        attributes: req.attributes,
        search: None,
    };

    let products = product_queries::list(&state.db, &filter, req.sort, page).await?;
    let total = product_queries::count(&state.db, &filter).await?;

    Ok(Json(Paginated::new(products, page, total)))
}

pub async fn search_products(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ProductSearchQuery>,
) -> Result<Json<Paginated<ProductSummary>>> {
    let term = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or(AppError::BadRequest("Search query is required".to_string()))?;

    let page = PageRequest::new(params.page, params.page_size, SEARCH_PAGE_SIZE);
    let filter = ProductFilter {
        locale: resolve_request_locale(params.locale.as_deref()),
        status: PublicationStatus::Published,
        search: Some(term.to_string()),
        ..Default::default()
    };

    let products = product_queries::list(&state.db, &filter, ProductSort::default(), page).await?;
    let total = product_queries::count(&state.db, &filter).await?;

    Ok(Json(Paginated::new(products, page, total)))
}

pub async fn product_slugs(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<LocaleQuery>,
) -> Result<Json<DataResponse<Vec<SlugEntry>>>> {
    let slugs = find_slugs(
        &state.db,
        LocalizedTable::Products,
        &params.resolve(),
        PublicationStatus::Published,
    )
    .await?;

    Ok(Json(DataResponse::new(slugs)))
}

pub async fn get_product(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
    ApiQuery(params): ApiQuery<LocaleQuery>,
) -> Result<Json<DataResponse<ProductDetail>>> {
    let status = PublicationStatus::Published;
    let product = product_queries::find_by_slug(&state.db, &slug, &params.resolve(), status)
        .await?
        .ok_or(AppError::NotFound("Product not found".to_string()))?;

    let locale_slugs = locale_slugs(
        &state.db,
        LocalizedTable::Products,
        product.summary.document_id,
        &product.summary.locale,
        &product.summary.slug,
        status,
    )
    .await?;

    Ok(Json(DataResponse::new(ProductDetail {
        product,
        locale_slugs,
    })))
}

pub async fn product_metadata(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
    ApiQuery(params): ApiQuery<LocaleQuery>,
) -> Result<Json<DataResponse<SeoMetadata>>> {
    let status = PublicationStatus::Published;
    let seo = product_queries::find_seo_by_slug(&state.db, &slug, &params.resolve(), status)
        .await?
        .ok_or(AppError::NotFound("Product not found".to_string()))?;

    let metadata = seo_metadata(&state.db, LocalizedTable::Products, seo, status).await?;

    Ok(Json(DataResponse::new(metadata)))
}
