//! API request handlers, organized by domain:
//! - `auth`: signup, login, account
//! - `onboarding`: profile completion and updates
//! - `progress`: dashboard and stage
//! - `universities`: catalog, recommendations, shortlist and lock
//! - `tasks`: task CRUD and default generation
//! - `counsellor`: AI counsellor chat
//! - `misc`: health and option lists

mod auth;
mod counsellor;
mod misc;
mod onboarding;
mod progress;
mod tasks;
mod universities;

pub use auth::{change_password, login, logout, me, signup};
pub use counsellor::counsellor;
pub use misc::{health, options};
pub use onboarding::{complete_onboarding, onboarding_status, update_profile};
pub use progress::{dashboard, stage};
pub use tasks::{create_task, delete_task, generate_tasks, get_task, list_tasks, update_task};
pub use universities::{
    get_university, list_locked, list_shortlisted, list_universities, lock, recommendations,
    remove_from_shortlist, shortlist, unlock,
};
