pub mod category_service;
pub mod content_store;
pub mod email_service;
pub mod inquiry_service;
pub mod subscriber_service;
pub mod upload_service;

pub use content_store::{ContentStore, PgContentStore};
pub use email_service::{Mailer, SesMailer};
pub use upload_service::{StoredUpload, UploadStore};
