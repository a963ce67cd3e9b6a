use crate::{
    error::{AppError, Result},
    models::Subscriber,
    services::ContentStore,
};

pub const ALREADY_SUBSCRIBED: &str = "This email is already subscribed.";

fn normalize_email(email: Option<&str>) -> Result<String> {
    let email = email.map(str::trim).unwrap_or_default().to_lowercase();
    if email.is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()));
    }
    if !email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    Ok(email)
}

/// Store a newsletter subscription. Emails are compared case-insensitively.
pub async fn subscribe(store: &dyn ContentStore, email: Option<&str>) -> Result<Subscriber> {
    let email = normalize_email(email)?;

    if store.find_subscriber(&email).await?.is_some() {
        return Err(AppError::BadRequest(ALREADY_SUBSCRIBED.to_string()));
    }

    let subscriber = store.create_subscriber(&email).await.map_err(|e| match e {
        AppError::Conflict(_) => AppError::BadRequest(ALREADY_SUBSCRIBED.to_string()),
        other => other,
    })?;

    tracing::info!(subscriber_id = subscriber.id, "New newsletter subscriber");

    Ok(subscriber)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Mutex;

    use super::*;
    use crate::{
        models::{InquiryWithAttachments, NewInquiry, PublicationStatus},
        services::upload_service::StoredUpload,
    };

    #[derive(Default)]
    struct MemoryStore {
        subscribers: Arc<Mutex<Vec<Subscriber>>>,
        race_conflict: bool,
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

        async fn find_subscriber(&self, email: &str) -> Result<Option<Subscriber>> {
            Ok(self
                .subscribers
                .lock()
                .await
                .iter()
                .find(|s| s.email == email)
                .cloned())
        }

        async fn create_subscriber(&self, email: &str) -> Result<Subscriber> {
            if self.race_conflict {
                return Err(AppError::Conflict("duplicate".to_string()));
            }
            let mut subscribers = self.subscribers.lock().await;
            let subscriber = Subscriber {
                id: subscribers.len() as i32 + 1,
                email: email.to_string(),
                created_at: Utc::now(),
            };
            subscribers.push(subscriber.clone());
            Ok(subscriber)
        }

        async fn create_inquiry(
            &self,
            _inquiry: &NewInquiry,
            _attachments: &[StoredUpload],
        ) -> Result<InquiryWithAttachments> {
            unimplemented!()
        }
    }

    #[tokio::test]
    async fn creates_new_subscriber() {
        let store = MemoryStore::default();

        let subscriber = subscribe(&store, Some(" Buyer@Example.com ")).await.unwrap();

        assert_eq!(subscriber.email, "buyer@example.com");
        assert_eq!(store.subscribers.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn rejects_duplicate_without_creating_a_record() {
        let store = MemoryStore::default();
        subscribe(&store, Some("buyer@example.com")).await.unwrap();

        let result = subscribe(&store, Some("BUYER@example.com")).await;

        match result {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, ALREADY_SUBSCRIBED),
            other => panic!("expected duplicate rejection, got {:?}", other),
        }
        assert_eq!(store.subscribers.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn unique_violation_maps_to_duplicate_message() {
        let store = MemoryStore {
            race_conflict: true,
            ..Default::default()
        };

        let result = subscribe(&store, Some("buyer@example.com")).await;

        assert!(matches!(result, Err(AppError::BadRequest(ref msg)) if msg == ALREADY_SUBSCRIBED));
    }

    #[tokio::test]
    async fn requires_a_plausible_email() {
        let store = MemoryStore::default();

        assert!(matches!(subscribe(&store, None).await, Err(AppError::BadRequest(_))));
        assert!(matches!(
            subscribe(&store, Some("nope")).await,
            Err(AppError::BadRequest(_))
        ));
    }
}
