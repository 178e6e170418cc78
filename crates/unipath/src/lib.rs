//! Unipath backend library.
//!
//! Study-abroad guidance API: accounts, onboarding profiles, university
//! discovery and recommendations, the shortlist/lock workflow, tasks and the
//! counsellor assistant.

pub mod api;
pub mod auth;
pub mod catalog;
pub mod counsellor;
pub mod dashboard;
pub mod db;
pub mod options;
pub mod profile;
pub mod shortlist;
pub mod stage;
pub mod tasks;
pub mod user;
pub mod workflow;
