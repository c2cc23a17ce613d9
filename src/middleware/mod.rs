pub mod auth;
pub mod permissions;
pub mod security_headers;

pub use auth::{require_auth, AuthenticatedUser, MaybeUser};
pub use permissions::RequireAdmin;
pub use security_headers::security_headers;
