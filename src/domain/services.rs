use crate::domain::model::{Task, TaskCreate, TaskUpdate, DEFAULT_OWNER_ID};
use crate::domain::ports::TaskRepository;
use crate::utils::error::{AppError, Result};

pub const DEFAULT_LIST_LIMIT: usize = 100;

pub struct TaskService<R: TaskRepository> {
    repository: R,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub async fn list_tasks(
        &self,
        skip: usize,
        limit: usize,
        owner_id: Option<i64>,
    ) -> Result<Vec<Task>> {
        let tasks = self.repository.list(skip, limit, owner_id).await?;
        tracing::debug!("Listed {} tasks (skip={}, limit={})", tasks.len(), skip, limit);
        Ok(tasks)
    }

    pub async fn get_task(&self, id: i64) -> Result<Task> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(AppError::task_not_found)
    }

    pub async fn create_task(&self, input: TaskCreate) -> Result<Task> {
        let new_task = input.into_new_task(DEFAULT_OWNER_ID)?;
        let task = self.repository.insert(new_task).await?;
        tracing::info!("Created task {} '{}' ({})", task.id, task.name, task.frequency);
        Ok(task)
    }

    pub async fn update_task(&self, id: i64, update: TaskUpdate) -> Result<Task> {
        let task = self
            .repository
            .update(id, update)
            .await?
            .ok_or_else(AppError::task_not_found)?;
        tracing::info!("Updated task {}", task.id);
        Ok(task)
    }

    pub async fn delete_task(&self, id: i64) -> Result<Task> {
        let task = self
            .repository
            .delete(id)
            .await?
            .ok_or_else(AppError::task_not_found)?;
        tracing::info!("Deleted task {} '{}'", task.id, task.name);
        Ok(task)
    }
}
