use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};

use crate::{
    AppState,
    error::{AppError, Result},
    models::{InquiryForm, InquiryResponse},
    services::{
        StoredUpload,
        inquiry_service::{self, InquiryContext},
    },
};

const ATTACHMENTS_FIELD: &str = "attachments";

async fn read_parts(
    state: &AppState,
    multipart: &mut Multipart,
    form: &mut InquiryForm,
    uploads: &mut Vec<StoredUpload>,
) -> Result<()> {
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        if name == ATTACHMENTS_FIELD {
            if uploads.len() >= state.max_attachments {
                return Err(AppError::BadRequest(format!(
                    "At most {} attachments are allowed",
                    state.max_attachments
                )));
            }

            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?;
            if bytes.is_empty() && file_name.is_empty() {
                continue;
            }

            let upload = state
                .uploads
                .save(&file_name, content_type.as_deref(), &bytes)
                .await?;
            uploads.push(upload);
            continue;
        }

        let value = field.text().await?;
        match name.as_str() {
            "name" => form.name = Some(value),
            "email" => form.email = Some(value),
            "phone" => form.phone = Some(value),
            "company" => form.company = Some(value),
            "position" => form.position = Some(value),
            "message" => form.message = Some(value),
            other => tracing::debug!(field = other, "Ignoring unknown inquiry field"),
        }
    }

    Ok(())
}

pub async fn submit_inquiry(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<InquiryResponse>)> {
    let mut form = InquiryForm::default();
    let mut uploads = Vec::new();

    if let Err(e) = read_parts(&state, &mut multipart, &mut form, &mut uploads).await {
        state.uploads.cleanup(&uploads).await;
        return Err(e);
    }

    let ctx = InquiryContext {
        store: state.store.as_ref(),
        mailer: state.mailer.as_ref(),
        uploads: &state.uploads,
        email: &state.email,
    };

    let inquiry = inquiry_service::submit_inquiry(&ctx, form, uploads).await?;

    Ok((
        StatusCode::CREATED,
        Json(InquiryResponse {
            message: "Inquiry submitted successfully.",
            inquiry,
        }),
    ))
}
