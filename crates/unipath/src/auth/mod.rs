//! Authentication module.
//!
//! HS256 session tokens issued at signup/login and checked by
//! [`auth_middleware`] on every protected route.

mod claims;
mod config;
mod error;
mod middleware;

pub use claims::Claims;
pub use config::{AuthConfig, ConfigValidationError};
pub use error::AuthError;
pub use middleware::{AuthState, CurrentUser, auth_middleware};
