mod app_config;

pub use app_config::{
    AppConfig, AwsConfig, CorsConfig, DatabaseConfig, EmailConfig, ServerConfig, UploadConfig,
};
