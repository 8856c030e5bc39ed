use axum::Json;
use serde_json::{json, Value};

/// 健康检查
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "todo-reminder",
        "timestamp": chrono::Utc::now(),
    }))
}
