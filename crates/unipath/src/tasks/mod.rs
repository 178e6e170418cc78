//! Per-user task list.

mod defaults;
mod models;
mod repository;
mod service;

pub use defaults::{DEFAULT_TASKS, DefaultTask, Readiness};
pub use models::{
    CreateTaskRequest, GenerateTasksResponse, Task, TaskListQuery, TaskResponse, TaskStatus,
    UpdateTaskRequest,
};
pub use repository::TaskRepository;
pub use service::TaskService;
