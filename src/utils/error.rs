use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API responded with status {status}: {detail}")]
    ApiError { status: u16, detail: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{message}")]
    ValidationError { message: String },

    #[error("{message}")]
    BadRequest { message: String },

    #[error("{message}")]
    NotFound { message: String },
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn task_not_found() -> Self {
        AppError::NotFound {
            message: "Task not found".to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::ValidationError { .. } | AppError::InvalidValueError { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::ApiError { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 對外顯示的錯誤訊息，內部錯誤不洩漏細節
    pub fn detail(&self) -> String {
        match self {
            AppError::NotFound { message }
            | AppError::BadRequest { message }
            | AppError::ValidationError { message } => message.clone(),
            AppError::InvalidValueError { field, reason, .. } => format!("{}: {}", field, reason),
            AppError::ApiError { detail, .. } => detail.clone(),
            _ => "Internal server error".to_string(),
        }
    }
}

// 請求解析失敗也要走 {"detail": ...} 格式
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        match rejection.status() {
            StatusCode::UNPROCESSABLE_ENTITY => AppError::ValidationError { message },
            _ => AppError::BadRequest { message },
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("❌ Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }

        let body = serde_json::json!({ "detail": self.detail() });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::task_not_found().status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::BadRequest {
                message: "bad".to_string()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::ConfigError {
                message: "broken".to_string()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = AppError::IoError(std::io::Error::other("disk on fire"));
        assert_eq!(err.detail(), "Internal server error");
        assert_eq!(AppError::task_not_found().detail(), "Task not found");
    }
}
