use crate::error::{AppError, Result};
use std::{env, path::PathBuf};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub email: EmailConfig,
    pub uploads: UploadConfig,
    pub aws: AwsConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Addresses used for outgoing notification mail.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub from: String,
    pub inquiry_to: String,
    pub subject_prefix: String,
}

#[derive(Clone)]
pub struct AwsConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
}

impl std::fmt::Debug for AwsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsConfig")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("region", &self.region)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_attachments: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .map_err(|_| AppError::ConfigError("Invalid PORT value".to_string()))?,
                max_body_size: env::var("MAX_BODY_SIZE")
                    .unwrap_or_else(|_| "10485760".to_string())
                    .parse()
                    .map_err(|_| AppError::ConfigError("Invalid MAX_BODY_SIZE value".to_string()))?,
            },
            database: DatabaseConfig {
                url: env::var("DB_URL")?,
                max_connections: env::var("DB_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::ConfigError("Invalid DB_MAX_CONNECTIONS value".to_string())
                    })?,
            },
            cors: CorsConfig {
                allowed_origins: env::var("FRONTEND_URL")?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            email: EmailConfig {
                from: env::var("EMAIL_FROM")
                    .map_err(|_| AppError::ConfigError("EMAIL_FROM not set".to_string()))?,
                inquiry_to: env::var("INQUIRY_NOTIFY_TO")
                    .map_err(|_| AppError::ConfigError("INQUIRY_NOTIFY_TO not set".to_string()))?,
                subject_prefix: env::var("EMAIL_SUBJECT_PREFIX").unwrap_or_default(),
            },
            uploads: UploadConfig {
                dir: env::var("UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| env::temp_dir().join("storefront-uploads")),
                max_attachments: env::var("MAX_ATTACHMENTS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .map_err(|_| {
                        AppError::ConfigError("Invalid MAX_ATTACHMENTS value".to_string())
                    })?,
            },
            aws: AwsConfig {
                access_key_id: env::var("AWS_ACCESS_KEY_ID")
                    .map_err(|_| AppError::ConfigError("AWS_ACCESS_KEY_ID not set".to_string()))?,
                secret_access_key: env::var("AWS_SECRET_ACCESS_KEY").map_err(|_| {
                    AppError::ConfigError("AWS_SECRET_ACCESS_KEY not set".to_string())
                })?,
                region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
