use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{auth::AuthError, error::ApiResult, response::ApiResponse, routes::AppState};

/// 登录请求
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 登录响应
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
}

/// 管理员登录，校验通过后签发JWT
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<ApiResponse<LoginResponse>> {
    if request.username != state.admin.username || request.password != state.admin.password {
        warn!("登录失败: 用户名 {}", request.username);
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state
        .jwt
        .generate_token(state.admin.user_id)
        .map_err(|e| todo_core::TodoError::Internal(format!("签发令牌失败: {e}")))?;

    info!("管理员登录成功: {}", request.username);
    Ok(ApiResponse::success(LoginResponse {
        token,
        expires_in: state.jwt.expiration_hours() * 3600,
    }))
}
