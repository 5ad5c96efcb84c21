use chrono::NaiveDate;
use httpmock::prelude::*;
use lastdone::{
    build_router, ApiClient, AppError, FileTaskRepository, Frequency, MemoryStorage, Settings,
    TaskCreate, TaskService, TaskUpdate,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

/// 收集 tracing 輸出以便檢查日誌內容
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    fn lines_containing(&self, needle: &str) -> Vec<String> {
        String::from_utf8(self.0.lock().unwrap().clone())
            .unwrap()
            .lines()
            .filter(|line| line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

const BODY_LINE: &str = r#"{"message":"hello"}"#;
const ERROR_LINE: &str = "Error fetching data:";

fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_target(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}

fn task_json(id: i64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "description": null,
        "owner_id": 1,
        "frequency": "weekly",
        "frequency_value": null,
        "last_done": null,
        "next_to_do": null,
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:00:00Z"
    })
}

#[tokio::test]
async fn test_fetch_data_requests_api_path() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"message": "hello"}));
        })
        .await;

    let client = ApiClient::new(&server.base_url()).unwrap();
    let body = client.fetch_data().await.unwrap();

    api_mock.assert_async().await;
    assert_eq!(body, json!({"message": "hello"}));
}

#[tokio::test]
async fn test_fetch_data_logs_body_on_success() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api");
            then.status(200).json_body(json!({"message": "hello"}));
        })
        .await;

    let client = ApiClient::new(&server.base_url()).unwrap();
    let (logs, _guard) = capture_logs();
    client.fetch_data().await.unwrap();

    let body_lines = logs.lines_containing(BODY_LINE);
    assert_eq!(body_lines.len(), 1, "{:?}", body_lines);
    assert!(body_lines[0].contains("INFO"));
    assert!(logs.lines_containing(ERROR_LINE).is_empty());
}

#[tokio::test]
async fn test_fetch_data_logs_error_on_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api");
            then.status(500).body("boom");
        })
        .await;

    let client = ApiClient::new(&server.base_url()).unwrap();
    let (logs, _guard) = capture_logs();
    assert!(client.fetch_data().await.is_err());

    let error_lines = logs.lines_containing(ERROR_LINE);
    assert_eq!(error_lines.len(), 1, "{:?}", error_lines);
    assert!(error_lines[0].contains("ERROR"));
    assert!(error_lines[0].contains("Error fetching data: API responded with status 500: boom"));

    // 連線失敗同樣只記錄一行錯誤
    let offline = ApiClient::new("http://127.0.0.1:9").unwrap();
    assert!(offline.fetch_data().await.is_err());

    let error_lines = logs.lines_containing(ERROR_LINE);
    assert_eq!(error_lines.len(), 2, "{:?}", error_lines);
    assert!(error_lines[1].contains("Error fetching data: HTTP request failed"));
    assert!(logs.lines_containing(BODY_LINE).is_empty());
}

#[tokio::test]
async fn test_fetch_data_reports_server_error() {
    let server = MockServer::start_async().await;
    let api_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api");
            then.status(500).body("boom");
        })
        .await;

    let client = ApiClient::new(&server.base_url()).unwrap();
    let err = client.fetch_data().await.unwrap_err();

    api_mock.assert_async().await;
    match err {
        AppError::ApiError { status, detail } => {
            assert_eq!(status, 500);
            assert_eq!(detail, "boom");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_data_reports_connection_error() {
    // 沒有服務在監聽的埠
    let client = ApiClient::new("http://127.0.0.1:9").unwrap();
    assert!(matches!(
        client.fetch_data().await,
        Err(AppError::HttpError(_))
    ));
}

#[tokio::test]
async fn test_create_and_list_tasks() {
    let server = MockServer::start_async().await;
    let create_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/tasks")
                .json_body(json!({"name": "Water plants", "frequency": "weekly"}));
            then.status(200).json_body(task_json(1, "Water plants"));
        })
        .await;
    let list_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v1/tasks")
                .query_param("skip", "0")
                .query_param("limit", "100");
            then.status(200).json_body(json!([task_json(1, "Water plants")]));
        })
        .await;

    let client = ApiClient::new(&server.base_url()).unwrap();
    let created = client
        .create_task(&TaskCreate {
            frequency: Frequency::Weekly,
            ..TaskCreate::new("Water plants")
        })
        .await
        .unwrap();
    let tasks = client.list_tasks(0, 100).await.unwrap();

    create_mock.assert_async().await;
    list_mock.assert_async().await;
    assert_eq!(created.id, 1);
    assert_eq!(tasks, vec![created]);
}

#[tokio::test]
async fn test_update_sends_only_given_fields() {
    let server = MockServer::start_async().await;
    let update_mock = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/api/v1/tasks/3")
                .json_body(json!({"last_done": "2024-05-02", "description": null}));
            then.status(200).json_body(task_json(3, "Sweep"));
        })
        .await;

    let client = ApiClient::new(&server.base_url()).unwrap();
    let update = TaskUpdate {
        description: Some(None),
        last_done: Some(NaiveDate::from_ymd_opt(2024, 5, 2)),
        ..Default::default()
    };
    let task = client.update_task(3, &update).await.unwrap();

    update_mock.assert_async().await;
    assert_eq!(task.name, "Sweep");
}

#[tokio::test]
async fn test_not_found_detail_is_surfaced() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path("/api/v1/tasks/8");
            then.status(404).json_body(json!({"detail": "Task not found"}));
        })
        .await;

    let client = ApiClient::new(&server.base_url()).unwrap();
    match client.delete_task(8).await {
        Err(AppError::ApiError { status, detail }) => {
            assert_eq!(status, 404);
            assert_eq!(detail, "Task not found");
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_client_against_running_server() {
    let repository = FileTaskRepository::open(MemoryStorage::new()).await.unwrap();
    let app = build_router(TaskService::new(repository), &Settings::default()).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = ApiClient::new(&format!("http://{}", addr)).unwrap();

    let welcome = client.fetch_data().await.unwrap();
    assert_eq!(welcome["message"], "Welcome to the lastdone API!");

    let task = client
        .create_task(&TaskCreate {
            frequency: Frequency::Other,
            frequency_value: Some(10),
            ..TaskCreate::new("Feed sourdough starter")
        })
        .await
        .unwrap();
    assert_eq!(task.frequency_value, Some(10));

    let err = client
        .update_task(
            task.id,
            &TaskUpdate {
                frequency: Some(Frequency::Other),
                frequency_value: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ApiError { status: 400, .. }));

    let removed = client.delete_task(task.id).await.unwrap();
    assert_eq!(removed.id, task.id);
    assert!(client.list_tasks(0, 100).await.unwrap().is_empty());
}
