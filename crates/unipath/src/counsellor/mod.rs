//! AI counsellor.
//!
//! A [`CounsellorModel`] turns the user's message plus their context into a
//! [`Plan`]. The service then validates and executes the plan's actions
//! through the regular shortlist and task services, so a model can never
//! bypass the workflow rules.

mod config;
mod context;
mod error;
mod gemini;
mod model;
mod models;
mod rules;
mod service;

pub use config::{CounsellorConfig, Provider};
pub use context::CounsellorContext;
pub use error::{CounsellorError, CounsellorResult};
pub use gemini::GeminiModel;
pub use model::{CounsellorModel, build_model};
pub use models::{
    ActionResult, ActionStatus, CounsellorRequest, CounsellorResponse, Intent, Plan,
    PlannedAction,
};
pub use rules::RuleBasedModel;
pub use service::CounsellorService;
