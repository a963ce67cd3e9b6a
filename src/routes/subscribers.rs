use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    AppState,
    error::Result,
    models::{SubscribeRequest, SubscribeResponse},
    services::subscriber_service,
};

pub async fn subscribe(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SubscribeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubscribeResponse>)> {
    let Json(req) = payload?;

    let subscriber =
        subscriber_service::subscribe(state.store.as_ref(), req.email.as_deref()).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubscribeResponse {
            message: "Successfully subscribed.",
            subscriber,
        }),
    ))
}
