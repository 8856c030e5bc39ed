use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use todo_core::TodoError;

use crate::auth::AuthError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("业务错误: {0}")]
    Todo(#[from] TodoError),

    #[error("认证错误: {0}")]
    Authentication(#[from] AuthError),

    #[error("未找到资源")]
    NotFound,

    #[error("请求参数错误: {0}")]
    BadRequest(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::Todo(TodoError::TodoNotFound { id }) => (
                StatusCode::NOT_FOUND,
                "TODO_NOT_FOUND",
                format!("待办事项 {id} 不存在"),
            ),
            ApiError::Todo(TodoError::DuplicateTitle { title }) => (
                StatusCode::CONFLICT,
                "DUPLICATE_TITLE",
                format!("同名待办事项已存在: {title}"),
            ),
            ApiError::Todo(e) => {
                error!("处理请求时发生内部错误: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "内部服务器错误".to_string(),
                )
            }
            ApiError::Authentication(AuthError::MalformedHeader) => (
                StatusCode::BAD_REQUEST,
                "MALFORMED_AUTHORIZATION",
                AuthError::MalformedHeader.to_string(),
            ),
            ApiError::Authentication(e) => {
                (StatusCode::UNAUTHORIZED, "AUTHENTICATION_ERROR", e.to_string())
            }
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "未找到资源".to_string(),
            ),
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "type": error_type,
                "message": message,
            },
            "timestamp": chrono::Utc::now(),
        }));

        (status, body).into_response()
    }
}
