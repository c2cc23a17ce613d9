pub mod auth;
pub mod database;
pub mod drafts;
pub mod notifications;
pub mod server;

use once_cell::sync::Lazy;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server: server::ServerConfig,
    pub database: database::DatabaseConfig,
    pub auth: auth::AuthConfig,
    pub notifications: notifications::NotificationsConfig,
    pub drafts: drafts::DraftsConfig,

    // Build info
    pub commit_hash: String,
    pub build_time: String,
    pub version: String,

    // Logging
    pub log_level: String,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server: server::ServerConfig::from_env(),
            database: database::DatabaseConfig::from_env(),
            auth: auth::AuthConfig::from_env(),
            notifications: notifications::NotificationsConfig::from_env(),
            drafts: drafts::DraftsConfig::from_env(),

            // Build info
            commit_hash: env::var("COMMIT_HASH").unwrap_or_else(|_| "unknown".to_string()),
            build_time: env::var("BUILD_TIME").unwrap_or_else(|_| "unknown".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),

            // Logging
            log_level: env::var("ADOS_LOG_LEVEL").unwrap_or_else(|_| "debug".to_string()),
            log_format: env::var("ADOS_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
        }
    }

    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
