use axum::{Json, extract::State};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{
        BlogDetail, BlogSummary, DataResponse, ListQuery, PageRequest, Paginated,
        PublicationStatus, SeoMetadata, SlugEntry,
    },
    queries::{LocalizedTable, blog_queries, find_slugs},
    utils::locale::{LocaleQuery, resolve_request_locale},
};

use super::{ApiPath, ApiQuery, locale_slugs, seo_metadata};

const DEFAULT_PAGE_SIZE: i64 = 12;

pub async fn list_blogs(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListQuery>,
) -> Result<Json<Paginated<BlogSummary>>> {
    let page = PageRequest::new(params.page, params.page_size, DEFAULT_PAGE_SIZE);
    let locale = resolve_request_locale(params.locale.as_deref());

    let blogs = blog_queries::list(&state.db, &locale, params.status, page).await?;
    let total = blog_queries::count(&state.db, &locale, params.status).await?;

    Ok(Json(Paginated::new(blogs, page, total)))
}

pub async fn blog_slugs(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<LocaleQuery>,
) -> Result<Json<DataResponse<Vec<SlugEntry>>>> {
    let slugs = find_slugs(
        &state.db,
        LocalizedTable::Blogs,
        &params.resolve(),
        PublicationStatus::Published,
    )
    .await?;

    Ok(Json(DataResponse::new(slugs)))
}

pub async fn get_blog(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
    ApiQuery(params): ApiQuery<LocaleQuery>,
) -> Result<Json<DataResponse<BlogDetail>>> {
    let status = PublicationStatus::Published;
    let blog = blog_queries::find_by_slug(&state.db, &slug, &params.resolve(), status)
        .await?
        .ok_or(AppError::NotFound("Blog not found".to_string()))?;

    let locale_slugs = locale_slugs(
        &state.db,
        LocalizedTable::Blogs,
        blog.summary.document_id,
        &blog.summary.locale,
        &blog.summary.slug,
        status,
    )
    .await?;

    Ok(Json(DataResponse::new(BlogDetail { blog, locale_slugs })))
}

pub async fn blog_metadata(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
    ApiQuery(params): ApiQuery<LocaleQuery>,
) -> Result<Json<DataResponse<SeoMetadata>>> {
    let status = PublicationStatus::Published;
    let seo = blog_queries::find_seo_by_slug(&state.db, &slug, &params.resolve(), status)
        .await?
        .ok_or(AppError::NotFound("Blog not found".to_string()))?;

    let metadata = seo_metadata(&state.db, LocalizedTable::Blogs, seo, status).await?;

    Ok(Json(DataResponse::new(metadata)))
}
