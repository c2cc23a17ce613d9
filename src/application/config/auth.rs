use std::env;

/// Settings shared with the external identity provider.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 secret the identity provider signs access tokens with.
    pub jwt_secret: String,
    /// Profile role that unlocks administrator actions.
    pub admin_role: String,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            jwt_secret: env::var("ADOS_JWT_SECRET")
                .unwrap_or_else(|_| "ados-development-secret-change-me".to_string()),
            admin_role: env::var("ADOS_ADMIN_ROLE").unwrap_or_else(|_| "admin".to_string()),
        }
    }
}
