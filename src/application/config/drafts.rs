use std::env;

use chrono::Duration;

#[derive(Debug, Clone)]
pub struct DraftsConfig {
    /// How long an untouched questionnaire draft is kept (env: `ADOS_DRAFT_TTL_HOURS`)
    pub ttl_hours: i64,
}

impl DraftsConfig {
    pub fn from_env() -> Self {
        Self {
            ttl_hours: env::var("ADOS_DRAFT_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|h: &i64| *h > 0)
                .unwrap_or(168),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::hours(self.ttl_hours)
    }
}
