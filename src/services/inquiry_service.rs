use serde_json::Value;

use crate::{
    config::EmailConfig,
    error::{AppError, Result},
    models::{InquiryForm, InquiryWithAttachments, NewInquiry},
    services::{
        ContentStore, Mailer,
        email_service::{EmailAttachment, OutgoingEmail},
        upload_service::{StoredUpload, UploadStore},
    },
    utils::rich_text::{self, escape_html},
};

/// Collaborators an inquiry submission needs.
pub struct InquiryContext<'a> {
    pub store: &'a dyn ContentStore,
    pub mailer: &'a dyn Mailer,
    pub uploads: &'a UploadStore,
    pub email: &'a EmailConfig,
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts either a JSON block array or plain text for the message.
fn parse_message(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Array(_)) => value,
        _ => rich_text::paragraph_from_text(raw.trim()),
    }
}

pub fn validate_inquiry(form: InquiryForm) -> Result<NewInquiry> {
    let name = optional(form.name)
        .ok_or_else(|| AppError::BadRequest("Name is required".to_string()))?;

    let email = optional(form.email)
        .ok_or_else(|| AppError::BadRequest("Email is required".to_string()))?;
    if !email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }

    let message = optional(form.message)
        .ok_or_else(|| AppError::BadRequest("Message is required".to_string()))?;

    Ok(NewInquiry {
        name,
        email,
        phone: optional(form.phone),
        company: optional(form.company),
        position: optional(form.position),
        message: parse_message(&message),
    })
}

pub fn build_inquiry_email(
    inquiry: &InquiryWithAttachments,
    config: &EmailConfig,
    attachments: Vec<EmailAttachment>,
) -> OutgoingEmail {
    let record = &inquiry.inquiry;
    let message = rich_text::render_for_email(&record.message);
    let or_dash = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    let subject = if config.subject_prefix.is_empty() {
        format!("New Inquiry from {}", record.name)
    } else {
        format!("{} New Inquiry from {}", config.subject_prefix, record.name)
    };

    let fields = [
        ("Name", record.name.clone()),
        ("Email", record.email.clone()),
        ("Phone", or_dash(&record.phone)),
        ("Company", or_dash(&record.company)),
        ("Position", or_dash(&record.position)),
    ];

    let mut text = String::from("You received a new inquiry\n\n");
    let mut html = String::from("<h2>You received a new inquiry</h2>");
    for (label, value) in &fields {
        text.push_str(&format!("{}: {}\n", label, value));
        html.push_str(&format!(
            "<p><strong>{}:</strong> {}</p>",
            label,
            escape_html(value)
        ));
    }

    text.push_str(&format!("\nMessage:\n{}\n", message.text));
    html.push_str(&format!("<p><strong>Message:</strong></p>{}", message.html));

    if !inquiry.attachments.is_empty() {
        text.push_str("\nAttachments:\n");
        html.push_str("<p><strong>Attachments:</strong></p><ul>");
        for attachment in &inquiry.attachments {
            text.push_str(&format!("- {}\n", attachment.file_name));
            html.push_str(&format!("<li>{}</li>", escape_html(&attachment.file_name)));
        }
        html.push_str("</ul>");
    }

    OutgoingEmail {
        to: config.inquiry_to.clone(),
        from: config.from.clone(),
        reply_to: Some(record.email.clone()),
        subject,
        text,
        html,
        attachments,
    }
}

async fn persist_and_notify(
    ctx: &InquiryContext<'_>,
    form: InquiryForm,
    uploads: &[StoredUpload],
) -> Result<InquiryWithAttachments> {
    let new_inquiry = validate_inquiry(form)?;

    let inquiry = ctx.store.create_inquiry(&new_inquiry, uploads).await?;
    tracing::info!(inquiry_id = inquiry.inquiry.id, "Inquiry stored");

    let mut attachments = Vec::with_capacity(uploads.len());
    for upload in uploads {
        attachments.push(EmailAttachment {
            file_name: upload.original_name.clone(),
            content_type: upload.content_type.clone(),
            content: ctx.uploads.read(upload).await?,
        });
    }

    // The stored inquiry is kept even if this fails.
    let email = build_inquiry_email(&inquiry, ctx.email, attachments);
    ctx.mailer.send(email).await?;

    Ok(inquiry)
}

/// Validate, store, and email an inquiry. Uploaded files are removed
/// afterwards whatever the outcome.
pub async fn submit_inquiry(
    ctx: &InquiryContext<'_>,
    form: InquiryForm,
    uploads: Vec<StoredUpload>,
) -> Result<InquiryWithAttachments> {
    let result = persist_and_notify(ctx, form, &uploads).await;

    ctx.uploads.cleanup(&uploads).await;

    if let Err(ref e) = result {
        tracing::error!("Inquiry submission failed: {}", e);
    }

    result
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;
    use tokio::sync::Mutex;

    use super::*;
    use crate::models::{Inquiry, InquiryAttachment, PublicationStatus, Subscriber};

    #[derive(Default)]
    struct MemoryStore {
        inquiries: Arc<Mutex<Vec<NewInquiry>>>,
    }

    #[async_trait]
    impl ContentStore for MemoryStore {
        async fn child_category_slugs(
            &self,
            _parent_slug: &str,
            _locale: &str,
            _status: PublicationStatus,
        ) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        async fn find_subscriber(&self, _email: &str) -> Result<Option<Subscriber>> {
            Ok(None)
        }

        async fn create_subscriber(&self, _email: &str) -> Result<Subscriber> {
            unimplemented!()
        }

        async fn create_inquiry(
            &self,
            inquiry: &NewInquiry,
            attachments: &[StoredUpload],
        ) -> Result<InquiryWithAttachments> {
            let mut inquiries = self.inquiries.lock().await;
            inquiries.push(inquiry.clone());
            let id = inquiries.len() as i32;

            Ok(InquiryWithAttachments {
                inquiry: Inquiry {
                    id,
                    name: inquiry.name.clone(),
                    email: inquiry.email.clone(),
                    phone: inquiry.phone.clone(),
                    company: inquiry.company.clone(),
                    position: inquiry.position.clone(),
                    message: inquiry.message.clone(),
                    created_at: Utc::now(),
                },
                attachments: attachments
                    .iter()
                    .enumerate()
                    .map(|(i, upload)| InquiryAttachment {
                        id: i as i32 + 1,
                        inquiry_id: id,
                        file_name: upload.original_name.clone(),
                        content_type: upload.content_type.clone(),
                        size: upload.size as i64,
                        created_at: Utc::now(),
                    })
                    .collect(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: Arc<Mutex<Vec<OutgoingEmail>>>,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: OutgoingEmail) -> Result<()> {
            if self.fail {
                return Err(AppError::EmailError("smtp down".to_string()));
            }
            self.sent.lock().await.push(email);
            Ok(())
        }
    }

    fn config() -> EmailConfig {
        EmailConfig {
            from: "noreply@example.com".to_string(),
            inquiry_to: "sales@example.com".to_string(),
            subject_prefix: "[Straps]".to_string(),
        }
    }

    fn form() -> InquiryForm {
        InquiryForm {
            name: Some(" Ana ".to_string()),
            email: Some("ana@example.org".to_string()),
            phone: Some("".to_string()),
            company: Some("Cargo <Co>".to_string()),
            position: None,
            message: Some("Need 200 straps".to_string()),
        }
    }

    #[test]
    fn validation_trims_and_requires_fields() {
        let inquiry = validate_inquiry(form()).unwrap();
        assert_eq!(inquiry.name, "Ana");
        assert!(inquiry.phone.is_none());
        assert_eq!(inquiry.message, rich_text::paragraph_from_text("Need 200 straps"));

        let mut missing = form();
        missing.email = None;
        assert!(matches!(validate_inquiry(missing), Err(AppError::BadRequest(_))));

        let mut invalid = form();
        invalid.email = Some("not-an-email".to_string());
        assert!(matches!(validate_inquiry(invalid), Err(AppError::BadRequest(_))));

        let mut blank = form();
        blank.message = Some("   ".to_string());
        assert!(matches!(validate_inquiry(blank), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn message_accepts_block_json() {
        let mut with_blocks = form();
        with_blocks.message = Some(
            json!([{ "type": "paragraph", "children": [{ "text": "Hi", "italic": true }] }])
                .to_string(),
        );

        let inquiry = validate_inquiry(with_blocks).unwrap();

        assert_eq!(rich_text::to_html(&inquiry.message).unwrap(), "<p><em>Hi</em></p>");
    }

    #[tokio::test]
    async fn submits_stores_emails_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStore::new(dir.path());
        let upload = uploads
            .save("drawing.pdf", Some("application/pdf"), b"%PDF")
            .await
            .unwrap();
        let store = MemoryStore::default();
        let mailer = RecordingMailer::default();
        let email = config();
        let ctx = InquiryContext {
            store: &store,
            mailer: &mailer,
            uploads: &uploads,
            email: &email,
        };

        let result = submit_inquiry(&ctx, form(), vec![upload.clone()])
            .await
            .unwrap();

        assert_eq!(result.attachments.len(), 1);
        assert!(!upload.path.exists());

        let sent = mailer.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "sales@example.com");
        assert_eq!(sent[0].reply_to.as_deref(), Some("ana@example.org"));
        assert_eq!(sent[0].subject, "[Straps] New Inquiry from Ana");
        assert!(sent[0].html.contains("Cargo &lt;Co&gt;"));
        assert!(sent[0].html.contains("<p>Need 200 straps</p>"));
        assert!(sent[0].text.contains("Phone: -"));
        assert_eq!(sent[0].attachments[0].content, b"%PDF");
    }

    #[tokio::test]
    async fn email_failure_keeps_record_and_still_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStore::new(dir.path());
        let upload = uploads.save("a.txt", None, b"x").await.unwrap();
        let store = MemoryStore::default();
        let mailer = RecordingMailer {
            fail: true,
            ..Default::default()
        };
        let email = config();
        let ctx = InquiryContext {
            store: &store,
            mailer: &mailer,
            uploads: &uploads,
            email: &email,
        };

        let result = submit_inquiry(&ctx, form(), vec![upload.clone()]).await;

        assert!(matches!(result, Err(AppError::EmailError(_))));
        assert_eq!(store.inquiries.lock().await.len(), 1);
        assert!(!upload.path.exists());
    }

    #[tokio::test]
    async fn invalid_form_is_not_stored() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = UploadStore::new(dir.path());
        let upload = uploads.save("a.txt", None, b"x").await.unwrap();
        let store = MemoryStore::default();
        let mailer = RecordingMailer::default();
        let email = config();
        let ctx = InquiryContext {
            store: &store,
            mailer: &mailer,
            uploads: &uploads,
            email: &email,
        };

        let result = submit_inquiry(&ctx, InquiryForm::default(), vec![upload.clone()]).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert!(store.inquiries.lock().await.is_empty());
        assert!(mailer.sent.lock().await.is_empty());
        assert!(!upload.path.exists());
    }

    #[test]
    fn malformed_message_uses_placeholder() {
        let inquiry = InquiryWithAttachments {
            inquiry: Inquiry {
                id: 1,
                name: "Ana".to_string(),
                email: "ana@example.org".to_string(),
                phone: None,
                company: None,
                position: None,
                message: json!([{ "type": "paragraph", "children": 3 }]),
                created_at: Utc::now(),
            },
            attachments: Vec::new(),
        };

        let email = build_inquiry_email(&inquiry, &config(), Vec::new());

        assert!(email.html.contains("<p>[Error processing message content]</p>"));
        assert!(email.text.contains("[Error processing message content]"));
        assert!(!email.html.contains("Attachments"));
    }
}
