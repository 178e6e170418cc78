//! Onboarding and the study profile.

mod models;
mod repository;
mod service;

pub use models::{OnboardingResponse, OnboardingStatus, Profile, ProfileBrief, ProfileRequest};
pub use repository::ProfileRepository;
pub use service::ProfileService;
