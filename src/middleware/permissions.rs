//! Administrator gate
//!
//! ```ignore
//! async fn list_invites(RequireAdmin(admin): RequireAdmin) -> Result<Json<...>> { ... }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::config::CONFIG;
use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::models::profile;

/// Extractor that requires the caller's profile role to be the configured admin role.
/// Must run behind [`require_auth`](crate::middleware::require_auth).
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub profile::Model);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get authenticated user from extensions (set by auth middleware)
        let auth_user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        if !auth_user.profile().is_admin(&CONFIG.auth.admin_role) {
            return Err(AppError::Forbidden(
                "Administrator access required".to_string(),
            ));
        }

        Ok(RequireAdmin(auth_user.0.clone()))
    }
}
