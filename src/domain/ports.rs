use crate::domain::model::{NewTask, Task, TaskUpdate};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn project_name(&self) -> &str;
    fn api_v1_str(&self) -> &str;
    fn cors_origins(&self) -> &[String];
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<Task>>;
    /// Tasks ordered by id; `skip`/`limit` apply after the owner filter.
    async fn list(&self, skip: usize, limit: usize, owner_id: Option<i64>) -> Result<Vec<Task>>;
    async fn insert(&self, task: NewTask) -> Result<Task>;
    /// Applies `update` and bumps `updated_at` as one step; `None` if the id is unknown.
    async fn update(&self, id: i64, update: TaskUpdate) -> Result<Option<Task>>;
    async fn delete(&self, id: i64) -> Result<Option<Task>>;
}
