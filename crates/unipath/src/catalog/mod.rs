//! University reference catalog and recommendation logic.

mod models;
pub mod recommend;
mod repository;

pub use models::{
    Category, Difficulty, Likelihood, NewUniversity, Risk, University, UniversityQuery,
};
pub use recommend::{Acceptance, RecommendedUniversity, Recommendations};
pub use repository::UniversityRepository;
