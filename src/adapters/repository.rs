use crate::domain::model::{NewTask, Task, TaskUpdate};
use crate::domain::ports::{Storage, TaskRepository};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

pub const TASKS_FILE: &str = "tasks.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TaskTable {
    /// Ids are never reused, even after deletes.
    next_id: i64,
    tasks: BTreeMap<i64, Task>,
}

impl Default for TaskTable {
    fn default() -> Self {
        Self {
            next_id: 1,
            tasks: BTreeMap::new(),
        }
    }
}

/// Task table kept in memory and written through a [`Storage`] after every change.
pub struct FileTaskRepository<S: Storage> {
    storage: S,
    table: Mutex<TaskTable>,
}

impl<S: Storage> FileTaskRepository<S> {
    pub async fn open(storage: S) -> Result<Self> {
        let table = match storage.read_file(TASKS_FILE).await {
            Ok(bytes) => {
                let table: TaskTable = serde_json::from_slice(&bytes)?;
                tracing::info!("📂 Loaded {} tasks from {}", table.tasks.len(), TASKS_FILE);
                table
            }
            Err(AppError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No {} found, starting with an empty task list", TASKS_FILE);
                TaskTable::default()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            storage,
            table: Mutex::new(table),
        })
    }

    /// 先寫入儲存體，成功後才替換記憶體中的資料表
    async fn commit(&self, current: &mut TaskTable, next: TaskTable) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(&next)?;
        self.storage.write_file(TASKS_FILE, &bytes).await?;
        *current = next;
        Ok(())
    }
}

#[async_trait]
impl<S: Storage> TaskRepository for FileTaskRepository<S> {
    async fn get(&self, id: i64) -> Result<Option<Task>> {
        let table = self.table.lock().await;
        Ok(table.tasks.get(&id).cloned())
    }

    async fn list(&self, skip: usize, limit: usize, owner_id: Option<i64>) -> Result<Vec<Task>> {
        let table = self.table.lock().await;
        let tasks = table
            .tasks
            .values()
            .filter(|task| owner_id.map_or(true, |owner| task.owner_id == owner))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect();
        Ok(tasks)
    }

    async fn insert(&self, task: NewTask) -> Result<Task> {
        let mut table = self.table.lock().await;
        let mut next = table.clone();

        let task = task.into_task(next.next_id, Utc::now());
        next.next_id += 1;
        next.tasks.insert(task.id, task.clone());

        self.commit(&mut table, next).await?;
        Ok(task)
    }

    async fn update(&self, id: i64, update: TaskUpdate) -> Result<Option<Task>> {
        // 讀取、套用、寫回都在同一把鎖內完成
        let mut table = self.table.lock().await;
        let mut next = table.clone();

        let Some(task) = next.tasks.get_mut(&id) else {
            return Ok(None);
        };
        update.apply_to(task)?;
        task.updated_at = Utc::now();
        let task = task.clone();

        self.commit(&mut table, next).await?;
        Ok(Some(task))
    }

    async fn delete(&self, id: i64) -> Result<Option<Task>> {
        let mut table = self.table.lock().await;
        let mut next = table.clone();

        let Some(task) = next.tasks.remove(&id) else {
            return Ok(None);
        };

        self.commit(&mut table, next).await?;
        Ok(Some(task))
    }
}
