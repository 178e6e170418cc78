//! Application state shared across handlers.

use std::sync::Arc;

use crate::auth::{AuthConfig, AuthState};
use crate::catalog::UniversityRepository;
use crate::counsellor::{CounsellorModel, CounsellorService};
use crate::dashboard::DashboardService;
use crate::db::Database;
use crate::profile::{ProfileRepository, ProfileService};
use crate::shortlist::{ShortlistRepository, ShortlistService};
use crate::stage::StageTracker;
use crate::tasks::{TaskRepository, TaskService};
use crate::user::{UserRepository, UserService};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle, used directly only by the health check.
    pub db: Database,
    /// Authentication state.
    pub auth: AuthState,
    pub users: Arc<UserService>,
    pub profiles: Arc<ProfileService>,
    pub stages: Arc<StageTracker>,
    /// Reference university catalog.
    pub universities: Arc<UniversityRepository>,
    pub shortlists: Arc<ShortlistService>,
    pub tasks: Arc<TaskService>,
    pub dashboard: Arc<DashboardService>,
    pub counsellor: Arc<CounsellorService>,
}

impl AppState {
    /// Wire every service onto the shared pool.
    pub fn new(db: Database, auth: AuthConfig, model: Arc<dyn CounsellorModel>) -> Self {
        let pool = db.pool().clone();

        let users = UserService::new(UserRepository::new(pool.clone()));
        let stages = StageTracker::new(pool.clone());
        let universities = UniversityRepository::new(pool.clone());
        let profiles = ProfileService::new(ProfileRepository::new(pool.clone()), stages.clone());
        let shortlists = ShortlistService::new(
            ShortlistRepository::new(pool.clone()),
            universities.clone(),
            ProfileRepository::new(pool.clone()),
            stages.clone(),
        );
        let tasks = TaskService::new(
            TaskRepository::new(pool.clone()),
            ProfileRepository::new(pool.clone()),
            ShortlistRepository::new(pool.clone()),
            stages.clone(),
        );
        let dashboard = DashboardService::new(
            ProfileRepository::new(pool.clone()),
            stages.clone(),
            TaskRepository::new(pool.clone()),
            ShortlistRepository::new(pool),
        );
        let counsellor = CounsellorService::new(
            model,
            profiles.clone(),
            stages.clone(),
            universities.clone(),
            shortlists.clone(),
            tasks.clone(),
        );

        Self {
            db,
            auth: AuthState::new(auth, users.clone()),
            users: Arc::new(users),
            profiles: Arc::new(profiles),
            stages: Arc::new(stages),
            universities: Arc::new(universities),
            shortlists: Arc::new(shortlists),
            tasks: Arc::new(tasks),
            dashboard: Arc::new(dashboard),
            counsellor: Arc::new(counsellor),
        }
    }
}
