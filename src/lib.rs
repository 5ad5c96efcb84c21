pub mod adapters;
pub mod app;
pub mod config;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::Cli;

pub use adapters::http::ApiClient;
pub use adapters::repository::FileTaskRepository;
pub use adapters::storage::{LocalStorage, MemoryStorage};
pub use app::server::{build_router, serve};
pub use config::Settings;
pub use domain::model::{Frequency, Task, TaskCreate, TaskUpdate};
pub use domain::services::TaskService;
pub use utils::error::{AppError, Result};
