//! Shortlist and lock workflow.
//!
//! Shortlisting moves a user into the locking stage and locking moves them
//! into the application stage. A locked entry can only be removed after it
//! has been unlocked.

mod models;
mod repository;
mod service;

pub use models::{
    LockRequest, LockResponse, RemoveResponse, ShortlistRequest, ShortlistResponse,
    ShortlistedList, ShortlistedUniversity,
};
pub use repository::ShortlistRepository;
pub use service::ShortlistService;
