use axum::{Json, extract::State};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{
        CategoryDetail, CategorySlugTree, CategorySubtree, CategoryWithRelations, DataResponse,
        PublicationStatus, SeoMetadata, SlugEntry,
    },
    queries::{LocalizedTable, category_queries, find_slugs},
    services::category_service,
    utils::locale::LocaleQuery,
};

use super::{ApiPath, ApiQuery, locale_slugs, seo_metadata};

const STATUS: PublicationStatus = PublicationStatus::Published;

pub async fn list_categories(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<LocaleQuery>,
) -> Result<Json<DataResponse<Vec<CategoryWithRelations>>>> {
    let categories = category_queries::get_all(&state.db, &params.resolve(), STATUS).await?;

    Ok(Json(DataResponse::new(category_queries::with_relations(
        categories,
    ))))
}

pub async fn category_slugs(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<LocaleQuery>,
) -> Result<Json<DataResponse<Vec<SlugEntry>>>> {
    let slugs = find_slugs(
        &state.db,
        LocalizedTable::Categories,
        &params.resolve(),
        STATUS,
    )
    .await?;

    Ok(Json(DataResponse::new(slugs)))
}

pub async fn category_slug_tree(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<LocaleQuery>,
) -> Result<Json<DataResponse<Vec<CategorySlugTree>>>> {
    let categories = category_queries::get_all(&state.db, &params.resolve(), STATUS).await?;

    Ok(Json(DataResponse::new(category_queries::slug_tree(
        &categories,
    ))))
}

pub async fn get_category(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
    ApiQuery(params): ApiQuery<LocaleQuery>,
) -> Result<Json<DataResponse<CategoryDetail>>> {
    let locale = params.resolve();
    let category = category_queries::find_by_slug(&state.db, &slug, &locale, STATUS)
        .await?
        .ok_or(AppError::NotFound("Category not found".to_string()))?;

    let locale_slugs = locale_slugs(
        &state.db,
        LocalizedTable::Categories,
        category.document_id,
        &category.locale,
        &category.slug,
        STATUS,
    )
    .await?;

    Ok(Json(DataResponse::new(CategoryDetail {
        category,
        locale_slugs,
    })))
}

pub async fn category_metadata(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
    ApiQuery(params): ApiQuery<LocaleQuery>,
) -> Result<Json<DataResponse<SeoMetadata>>> {
    let seo = category_queries::find_seo_by_slug(&state.db, &slug, &params.resolve(), STATUS)
        .await?
        .ok_or(AppError::NotFound("Category not found".to_string()))?;

    let metadata = seo_metadata(&state.db, LocalizedTable::Categories, seo, STATUS).await?;

    Ok(Json(DataResponse::new(metadata)))
}

pub async fn category_subtree(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
    ApiQuery(params): ApiQuery<LocaleQuery>,
) -> Result<Json<DataResponse<CategorySubtree>>> {
    let locale = params.resolve();

    category_queries::find_by_slug(&state.db, &slug, &locale, STATUS)
        .await?
        .ok_or(AppError::NotFound("Category not found".to_string()))?;

    let slugs =
        category_service::resolve_subtree(state.store.as_ref(), &slug, &locale, STATUS).await?;

    Ok(Json(DataResponse::new(CategorySubtree {
        root: slug,
        locale,
        slugs,
    })))
}
