use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    AppState,
    error::Result,
    models::{PageRequest, Paginated, ShowCase, ShowCaseListRequest},
    queries::show_case_queries,
    utils::locale::resolve_request_locale,
};

const DEFAULT_PAGE_SIZE: i64 = 10;

pub async fn list_show_cases(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ShowCaseListRequest>, JsonRejection>,
) -> Result<Json<Paginated<ShowCase>>> {
    let Json(req) = payload?;

    let page = PageRequest::new(req.page, req.page_size, DEFAULT_PAGE_SIZE);
    let locale = resolve_request_locale(req.locale.as_deref());

    let show_cases = show_case_queries::list(&state.db, &locale, req.status, page).await?;
    let total = show_case_queries::count(&state.db, &locale, req.status).await?;

    Ok(Json(Paginated::new(show_cases, page, total)))
}
