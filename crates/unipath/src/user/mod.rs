//! User accounts.
//!
//! Account CRUD and credential checks. Token handling lives in [`crate::auth`].

mod models;
mod repository;
mod service;

pub use models::{ChangePasswordRequest, LoginRequest, SignupRequest, User, UserInfo};
pub use repository::UserRepository;
pub use service::{UserService, hash_password, verify_password};
