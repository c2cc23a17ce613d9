use std::env;

/// SMTP relay settings for approval emails
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub from_name: String,
    pub use_tls: bool,
}

/// Outbound notification channels. A channel is only enabled when its settings are present.
#[derive(Debug, Clone, Default)]
pub struct NotificationsConfig {
    pub smtp: Option<SmtpConfig>,
    /// Bot token used to open DM channels (env: `ADOS_DISCORD_BOT_TOKEN`)
    pub discord_bot_token: Option<String>,
}

impl NotificationsConfig {
    pub fn from_env() -> Self {
        let smtp = env::var("ADOS_SMTP_HOST").ok().map(|host| SmtpConfig {
            host,
            port: env::var("ADOS_SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            username: env::var("ADOS_SMTP_USERNAME").unwrap_or_default(),
            password: env::var("ADOS_SMTP_PASSWORD").unwrap_or_default(),
            from_address: env::var("ADOS_SMTP_FROM")
                .unwrap_or_else(|_| "hello@ados.events".to_string()),
            from_name: env::var("ADOS_SMTP_FROM_NAME").unwrap_or_else(|_| "ADOS".to_string()),
            use_tls: env::var("ADOS_SMTP_TLS")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(true),
        });

        Self {
            smtp,
            discord_bot_token: env::var("ADOS_DISCORD_BOT_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
        }
    }
}
