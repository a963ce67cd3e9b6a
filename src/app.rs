use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::{AppConfig, EmailConfig},
    database,
    error::{AppError, Result},
    routes,
    services::{ContentStore, Mailer, PgContentStore, SesMailer, UploadStore},
};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub store: Arc<dyn ContentStore>,
    pub mailer: Arc<dyn Mailer>,
    pub uploads: UploadStore,
    pub email: EmailConfig,
    pub max_attachments: usize,
}

/// Routes with state applied but without the CORS and body-limit layers.
pub fn router(state: AppState) -> Router {
    routes::create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn build(config: &AppConfig) -> Result<Router> {
    let pool = database::create_pool(&config.database).await?;

    let uploads = UploadStore::new(config.uploads.dir.clone());
    uploads.ensure_dir().await?;

    let mailer = SesMailer::connect(&config.aws).await;

    let state = AppState {
        store: Arc::new(PgContentStore::new(pool.clone())),
        db: pool,
        mailer: Arc::new(mailer),
        uploads,
        email: config.email.clone(),
        max_attachments: config.uploads.max_attachments,
    };

    let allowed_origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| AppError::ConfigError(format!("Invalid CORS origin: {}", origin)))
        })
        .collect::<Result<Vec<_>>>()?;

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([http::header::CONTENT_TYPE, http::header::ACCEPT])
        .allow_origin(allowed_origins);

    let app = router(state)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(cors);

    Ok(app)
}
