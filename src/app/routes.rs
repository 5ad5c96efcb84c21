//! Request handlers for the task API.

use crate::app::extract::{JsonBody, PathParam, QueryParams};
use crate::app::server::AppState;
use crate::domain::model::{Task, TaskCreate, TaskUpdate};
use crate::domain::ports::TaskRepository;
use crate::domain::services::DEFAULT_LIST_LIMIT;
use crate::utils::error::Result;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

pub async fn read_root<R: TaskRepository + 'static>(
    State(state): State<AppState<R>>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": state.welcome.as_ref() }))
}

pub async fn read_tasks<R: TaskRepository + 'static>(
    State(state): State<AppState<R>>,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<Task>>> {
    let tasks = state
        .service
        .list_tasks(params.skip, params.limit, None)
        .await?;
    Ok(Json(tasks))
}

pub async fn create_task<R: TaskRepository + 'static>(
    State(state): State<AppState<R>>,
    JsonBody(input): JsonBody<TaskCreate>,
) -> Result<Json<Task>> {
    Ok(Json(state.service.create_task(input).await?))
}

pub async fn read_task<R: TaskRepository + 'static>(
    State(state): State<AppState<R>>,
    PathParam(task_id): PathParam<i64>,
) -> Result<Json<Task>> {
    Ok(Json(state.service.get_task(task_id).await?))
}

pub async fn update_task<R: TaskRepository + 'static>(
    State(state): State<AppState<R>>,
    PathParam(task_id): PathParam<i64>,
    JsonBody(update): JsonBody<TaskUpdate>,
) -> Result<Json<Task>> {
    Ok(Json(state.service.update_task(task_id, update).await?))
}

pub async fn delete_task<R: TaskRepository + 'static>(
    State(state): State<AppState<R>>,
    PathParam(task_id): PathParam<i64>,
) -> Result<Json<Task>> {
    Ok(Json(state.service.delete_task(task_id).await?))
}
