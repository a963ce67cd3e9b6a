use axum::{Json, extract::State};

use crate::{
    AppState,
    error::Result,
    models::{DataResponse, Faq, PublicationStatus},
    queries::faq_queries,
    utils::locale::LocaleQuery,
};

use super::{ApiPath, ApiQuery};

pub async fn global_faqs(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<LocaleQuery>,
) -> Result<Json<DataResponse<Vec<Faq>>>> {
    let faqs =
        faq_queries::find_global(&state.db, &params.resolve(), PublicationStatus::Published)
            .await?;

    Ok(Json(DataResponse::new(faqs)))
}

/// FAQs attached to a product; an unknown product yields an empty list.
pub async fn product_faqs(
    State(state): State<AppState>,
    ApiPath(slug): ApiPath<String>,
    ApiQuery(params): ApiQuery<LocaleQuery>,
) -> Result<Json<DataResponse<Vec<Faq>>>> {
    let faqs = faq_queries::find_by_product_slug(
        &state.db,
        &slug,
        &params.resolve(),
        PublicationStatus::Published,
    )
    .await?;

    Ok(Json(DataResponse::new(faqs)))
}
