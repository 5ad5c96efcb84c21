use crate::adapters::http::ROOT_API_PATH;
use crate::app::routes;
use crate::config::Settings;
use crate::domain::ports::{ConfigProvider, TaskRepository};
use crate::domain::services::TaskService;
use crate::utils::error::{AppError, Result};
use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct AppState<R: TaskRepository> {
    pub service: Arc<TaskService<R>>,
    pub welcome: Arc<str>,
}

impl<R: TaskRepository> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            welcome: Arc::clone(&self.welcome),
        }
    }
}

pub fn build_router<R, C>(service: TaskService<R>, config: &C) -> Result<Router>
where
    R: TaskRepository + 'static,
    C: ConfigProvider,
{
    let state = AppState {
        service: Arc::new(service),
        welcome: format!("Welcome to the {} API!", config.project_name()).into(),
    };

    let prefix = config.api_v1_str().trim_end_matches('/');
    let tasks_path = format!("{}/tasks", prefix);
    let task_path = format!("{}/tasks/{{task_id}}", prefix);

    let router = Router::new()
        .route("/", get(routes::read_root::<R>))
        .route(ROOT_API_PATH, get(routes::read_root::<R>))
        .route(
            &tasks_path,
            get(routes::read_tasks::<R>).post(routes::create_task::<R>),
        )
        .route(
            &task_path,
            get(routes::read_task::<R>)
                .put(routes::update_task::<R>)
                .delete(routes::delete_task::<R>),
        )
        .layer(cors_layer(config.cors_origins())?)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}

/// 允許指定來源攜帶憑證，方法與標頭全部放行
fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| AppError::InvalidValueError {
                field: "server.cors_origins".to_string(),
                value: origin.clone(),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

pub async fn serve<R>(service: TaskService<R>, settings: &Settings) -> Result<()>
where
    R: TaskRepository + 'static,
{
    let addr = settings.bind_addr()?;
    let app = build_router(service, settings)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("📦 {}", settings.project.banner());
    tracing::info!("🚀 Listening on http://{}", listener.local_addr()?);
    tracing::info!(
        "📋 Task API mounted at {}/tasks",
        settings.server.api_v1_str.trim_end_matches('/')
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("🛑 Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await
        }
    }
}
