use crate::domain::model::{Task, TaskCreate, TaskUpdate};
use crate::utils::error::{AppError, Result};
use crate::utils::validation::validate_url;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

/// Path of the welcome endpoint, relative to the server origin.
pub const ROOT_API_PATH: &str = "/api";

pub struct ApiClient {
    client: Client,
    base_url: Url,
    api_v1_str: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        validate_url("base_url", base_url)?;
        Ok(Self {
            client: Client::new(),
            base_url: Url::parse(base_url)?,
            api_v1_str: "/api/v1".to_string(),
        })
    }

    pub fn with_api_prefix(mut self, api_v1_str: impl Into<String>) -> Self {
        self.api_v1_str = api_v1_str.into();
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn tasks_endpoint(&self, id: Option<i64>) -> Result<Url> {
        match id {
            Some(id) => self.endpoint(&format!("{}/tasks/{}", self.api_v1_str, id)),
            None => self.endpoint(&format!("{}/tasks", self.api_v1_str)),
        }
    }

    /// 呼叫 `/api` 並記錄回應內容或錯誤
    pub async fn fetch_data(&self) -> Result<serde_json::Value> {
        let result = self.fetch_root().await;
        match &result {
            Ok(body) => tracing::info!("{}", body),
            Err(e) => tracing::error!("Error fetching data: {}", e),
        }
        result
    }

    async fn fetch_root(&self) -> Result<serde_json::Value> {
        let url = self.endpoint(ROOT_API_PATH)?;
        tracing::debug!("Making API request to: {}", url);
        let response = self.client.get(url).send().await?;
        decode(response).await
    }

    pub async fn list_tasks(&self, skip: usize, limit: usize) -> Result<Vec<Task>> {
        let url = self.tasks_endpoint(None)?;
        let response = self
            .client
            .get(url)
            .query(&[("skip", skip), ("limit", limit)])
            .send()
            .await?;
        decode(response).await
    }

    pub async fn get_task(&self, id: i64) -> Result<Task> {
        let response = self.client.get(self.tasks_endpoint(Some(id))?).send().await?;
        decode(response).await
    }

    pub async fn create_task(&self, task: &TaskCreate) -> Result<Task> {
        let response = self
            .client
            .post(self.tasks_endpoint(None)?)
            .json(task)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn update_task(&self, id: i64, update: &TaskUpdate) -> Result<Task> {
        let response = self
            .client
            .put(self.tasks_endpoint(Some(id))?)
            .json(update)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn delete_task(&self, id: i64) -> Result<Task> {
        let response = self
            .client
            .delete(self.tasks_endpoint(Some(id))?)
            .send()
            .await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    tracing::debug!("API response status: {}", status);

    if status.is_success() {
        return Ok(response.json().await?);
    }

    // 伺服器錯誤格式為 {"detail": "..."}，其他內容原樣保留
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| value.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or(body);

    Err(AppError::ApiError {
        status: status.as_u16(),
        detail,
    })
}
