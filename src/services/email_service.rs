use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sesv2::{
    Client as SesClient,
    config::Credentials,
    primitives::Blob,
    types::{Body, Content, Destination, EmailContent, Message, RawMessage},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use uuid::Uuid;

use crate::{
    config::AwsConfig,
    error::{AppError, Result},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAttachment {
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub from: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
    pub attachments: Vec<EmailAttachment>,
}

/// Outbound email service.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<()>;
}

pub struct SesMailer {
    client: SesClient,
}

impl SesMailer {
    pub fn new(client: SesClient) -> Self {
        Self { client }
    }

    pub async fn connect(aws: &AwsConfig) -> Self {
        let credentials = Credentials::new(
            aws.access_key_id.clone(),
            aws.secret_access_key.clone(),
            None,
            None,
            "env-credentials",
        );

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(aws.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        tracing::info!(region = %aws.region, "AWS SES client initialized");

        Self::new(SesClient::new(&config))
    }

    fn simple_content(email: &OutgoingEmail) -> Result<EmailContent> {
        let subject = Content::builder()
            .data(strip_line_breaks(&email.subject))
            .charset("UTF-8")
            .build()
            .map_err(|e| AppError::EmailError(format!("Failed to build subject: {}", e)))?;

        let text_body = Content::builder()
            .data(&email.text)
            .charset("UTF-8")
            .build()
            .map_err(|e| AppError::EmailError(format!("Failed to build text body: {}", e)))?;

        let html_body = Content::builder()
            .data(&email.html)
            .charset("UTF-8")
            .build()
            .map_err(|e| AppError::EmailError(format!("Failed to build HTML body: {}", e)))?;

        let body = Body::builder().text(text_body).html(html_body).build();

        let message = Message::builder().subject(subject).body(body).build();

        Ok(EmailContent::builder().simple(message).build())
    }

    fn raw_content(email: &OutgoingEmail) -> Result<EmailContent> {
        let mime = build_mime_message(email, &Uuid::new_v4().simple().to_string());

        let raw = RawMessage::builder()
            .data(Blob::new(mime))
            .build()
            .map_err(|e| AppError::EmailError(format!("Failed to build raw message: {}", e)))?;

        Ok(EmailContent::builder().raw(raw).build())
    }
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        let content = if email.attachments.is_empty() {
            Self::simple_content(&email)?
        } else {
            Self::raw_content(&email)?
        };

        let destination = Destination::builder().to_addresses(&email.to).build();

        let mut request = self
            .client
            .send_email()
            .from_email_address(&email.from)
            .destination(destination)
            .content(content);

        if let Some(ref reply_to) = email.reply_to {
            request = request.reply_to_addresses(reply_to);
        }

        request.send().await.map_err(|e| {
            tracing::error!("Failed to send email: {:?}", e);
            AppError::EmailError(format!("SES rejected message to {}", email.to))
        })?;

        tracing::info!(
            to = %email.to,
            attachments = email.attachments.len(),
            "Email sent"
        );

        Ok(())
    }
}

fn strip_line_breaks(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// Bytes per encoded-word; keeps each `=?UTF-8?B?...?=` within 75 characters.
const ENCODED_WORD_BYTES: usize = 45;

/// RFC 2047 encoded-words for non-ASCII header values, folded onto
/// continuation lines. Words never split a UTF-8 sequence.
fn encode_header(value: &str) -> String {
    let value = strip_line_breaks(value);
    if value.is_ascii() {
        return value;
    }

    let mut words = Vec::new();
    let mut start = 0;
    for (idx, ch) in value.char_indices() {
        if idx + ch.len_utf8() - start > ENCODED_WORD_BYTES {
            words.push(&value[start..idx]);
            start = idx;
        }
    }
    words.push(&value[start..]);

    words
        .into_iter()
        .map(|word| format!("=?UTF-8?B?{}?=", STANDARD.encode(word.as_bytes())))
        .collect::<Vec<_>>()
        .join("\r\n ")
}

/// Base64 body wrapped at 76 columns.
fn encode_body(bytes: &[u8]) -> String {
    let encoded = STANDARD.encode(bytes);
    encoded
        .as_bytes()
        .chunks(76)
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// `multipart/mixed` message: a text/html alternative part followed by
/// one base64 part per attachment.
pub fn build_mime_message(email: &OutgoingEmail, boundary_id: &str) -> Vec<u8> {
    let mixed = format!("mixed-{}", boundary_id);
    let alternative = format!("alt-{}", boundary_id);
    let mut out = String::new();

    out.push_str(&format!("From: {}\r\n", strip_line_breaks(&email.from)));
    out.push_str(&format!("To: {}\r\n", strip_line_breaks(&email.to)));
    if let Some(ref reply_to) = email.reply_to {
        out.push_str(&format!("Reply-To: {}\r\n", strip_line_breaks(reply_to)));
    }
    out.push_str(&format!("Subject: {}\r\n", encode_header(&email.subject)));
    out.push_str("MIME-Version: 1.0\r\n");
    out.push_str(&format!(
        "Content-Type: multipart/mixed; boundary=\"{}\"\r\n\r\n",
        mixed
    ));

    out.push_str(&format!("--{}\r\n", mixed));
    out.push_str(&format!(
        "Content-Type: multipart/alternative; boundary=\"{}\"\r\n\r\n",
        alternative
    ));
    for (content_type, body) in [("text/plain", &email.text), ("text/html", &email.html)] {
        out.push_str(&format!("--{}\r\n", alternative));
        out.push_str(&format!("Content-Type: {}; charset=UTF-8\r\n", content_type));
        out.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
        out.push_str(&encode_body(body.as_bytes()));
        out.push_str("\r\n");
    }
    out.push_str(&format!("--{}--\r\n", alternative));

    for attachment in &email.attachments {
        let file_name = encode_header(&attachment.file_name.replace('"', ""));
        out.push_str(&format!("--{}\r\n", mixed));
        out.push_str(&format!(
            "Content-Type: {}; name=\"{}\"\r\n",
            strip_line_breaks(&attachment.content_type),
            file_name
        ));
        out.push_str(&format!(
            "Content-Disposition: attachment; filename=\"{}\"\r\n",
            file_name
        ));
        out.push_str("Content-Transfer-Encoding: base64\r\n\r\n");
        out.push_str(&encode_body(&attachment.content));
        out.push_str("\r\n");
    }
    out.push_str(&format!("--{}--\r\n", mixed));

    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> OutgoingEmail {
        OutgoingEmail {
            to: "sales@example.com".to_string(),
            from: "noreply@example.com".to_string(),
            reply_to: Some("buyer@example.org".to_string()),
            subject: "New Inquiry from Ana".to_string(),
            text: "Hello".to_string(),
            html: "<p>Hello</p>".to_string(),
            attachments: vec![EmailAttachment {
                file_name: "spec.pdf".to_string(),
                content_type: "application/pdf".to_string(),
                content: b"%PDF".to_vec(),
            }],
        }
    }

    #[test]
    fn mime_message_has_headers_bodies_and_attachment() {
        let mime = String::from_utf8(build_mime_message(&email(), "b1")).unwrap();

        assert!(mime.starts_with("From: noreply@example.com\r\nTo: sales@example.com\r\n"));
        assert!(mime.contains("Reply-To: buyer@example.org\r\n"));
        assert!(mime.contains("Subject: New Inquiry from Ana\r\n"));
        assert!(mime.contains("boundary=\"mixed-b1\""));
        assert!(mime.contains("boundary=\"alt-b1\""));
        assert!(mime.contains(&STANDARD.encode("<p>Hello</p>")));
        assert!(mime.contains("Content-Disposition: attachment; filename=\"spec.pdf\""));
        assert!(mime.contains(&STANDARD.encode("%PDF")));
        assert!(mime.ends_with("--mixed-b1--\r\n"));
    }

    #[test]
    fn header_values_cannot_inject_lines() {
        let mut message = email();
        message.subject = "Hi\r\nBcc: victim@example.com".to_string();

        let mime = String::from_utf8(build_mime_message(&message, "b2")).unwrap();

        assert!(!mime.contains("\r\nBcc:"));
    }

    #[test]
    fn non_ascii_subject_is_encoded() {
        assert_eq!(
            encode_header("Anfrage von Jürgen"),
            format!("=?UTF-8?B?{}?=", STANDARD.encode("Anfrage von Jürgen"))
        );
        assert_eq!(encode_header("plain"), "plain");
    }

    #[test]
    fn long_non_ascii_subject_is_split_into_short_words() {
        let subject = "Anfrage für Spanngurte, Zurrketten und Ladungssicherung aus Göteborg";
        let encoded = encode_header(subject);

        let words: Vec<&str> = encoded.split("\r\n ").collect();
        assert!(words.len() > 1);
        assert!(words.iter().all(|word| word.len() <= 75));

        let decoded: Vec<u8> = words
            .iter()
            .flat_map(|word| {
                let payload = word
                    .strip_prefix("=?UTF-8?B?")
                    .and_then(|w| w.strip_suffix("?="))
                    .unwrap();
                STANDARD.decode(payload).unwrap()
            })
            .collect();
        assert_eq!(String::from_utf8(decoded).unwrap(), subject);
        for word in &words {
            let payload = &word[10..word.len() - 2];
            assert!(String::from_utf8(STANDARD.decode(payload).unwrap()).is_ok());
        }
    }

    #[test]
    fn body_lines_are_wrapped() {
        let body = encode_body(&[7u8; 200]);
        assert!(body.split("\r\n").all(|line| line.len() <= 76));
        assert!(body.contains("\r\n"));
    }
}
