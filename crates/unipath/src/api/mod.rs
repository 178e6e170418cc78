//! HTTP API module.
//!
//! JSON REST endpoints under `/api`, bearer-token or cookie authenticated.

mod error;
mod extract;
mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use routes::create_router;
pub use state::AppState;
