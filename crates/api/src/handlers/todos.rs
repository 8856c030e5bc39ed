use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use todo_core::TodoError;
use todo_domain::{
    entities::{DEFAULT_NOTIFY_FREQUENCY_MINUTES, DEFAULT_PRIORITY},
    ReorderEntry, Todo, TodoFilter,
};

use crate::{
    auth::AuthenticatedUser,
    error::{ApiError, ApiResult},
    response::{created, no_content, success, ApiResponse},
    routes::AppState,
};

/// 待办事项创建请求
#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<String>,
    pub notify_enabled: Option<bool>,
    pub notify_frequency_minutes: Option<i64>,
    pub telegram_enabled: Option<bool>,
    pub discord_enabled: Option<bool>,
}

/// 待办事项更新请求
#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub clear_due_date: bool,
    pub priority: Option<String>,
    pub completed: Option<bool>,
    pub notify_enabled: Option<bool>,
    pub notify_frequency_minutes: Option<i64>,
    pub telegram_enabled: Option<bool>,
    pub discord_enabled: Option<bool>,
}

/// 列表查询参数
#[derive(Debug, Deserialize)]
pub struct TodoQueryParams {
    pub priority: Option<String>,
    pub completed: Option<bool>,
    pub due_before: Option<DateTime<Utc>>,
}

/// 排序请求
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub items: Vec<ReorderItem>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderItem {
    pub id: Uuid,
    pub index: i64,
}

fn validate_frequency(minutes: i64) -> ApiResult<()> {
    if minutes < 0 {
        return Err(ApiError::BadRequest(
            "notify_frequency_minutes不能为负数".to_string(),
        ));
    }
    Ok(())
}

/// 创建待办事项
pub async fn create_todo(
    State(state): State<AppState>,
    AuthenticatedUser { user_id }: AuthenticatedUser,
    Json(request): Json<CreateTodoRequest>,
) -> ApiResult<impl IntoResponse> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("标题不能为空".to_string()));
    }

    let frequency = request
        .notify_frequency_minutes
        .unwrap_or(DEFAULT_NOTIFY_FREQUENCY_MINUTES);
    validate_frequency(frequency)?;

    let mut todo = Todo::new(user_id, title.to_string());
    todo.description = request.description;
    todo.due_date = request.due_date;
    todo.priority = request
        .priority
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| DEFAULT_PRIORITY.to_string());
    todo.notify_enabled = request.notify_enabled.unwrap_or(true);
    todo.notify_frequency_minutes = frequency;
    todo.telegram_enabled = request.telegram_enabled.unwrap_or(false);
    todo.discord_enabled = request.discord_enabled.unwrap_or(false);

    let todo = state.todo_repo.create(&todo).await?;
    info!("创建待办事项: {} ({})", todo.title, todo.id);
    Ok(created(todo))
}

/// 查询待办事项列表
pub async fn list_todos(
    State(state): State<AppState>,
    AuthenticatedUser { user_id }: AuthenticatedUser,
    Query(params): Query<TodoQueryParams>,
) -> ApiResult<impl IntoResponse> {
    let filter = TodoFilter {
        priority: params.priority,
        completed: params.completed,
        due_before: params.due_before,
    };
    let todos = state.todo_repo.list_for_user(user_id, &filter).await?;
    Ok(success(todos))
}

/// 查询单个待办事项
pub async fn get_todo(
    State(state): State<AppState>,
    AuthenticatedUser { user_id }: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let todo = state
        .todo_repo
        .find_by_id(id, user_id)
        .await?
        .ok_or(TodoError::TodoNotFound { id })?;
    Ok(success(todo))
}

/// 更新待办事项
///
/// 修改提醒设置会清空下次提醒时间，由扫描轮次重新初始化。
pub async fn update_todo(
    State(state): State<AppState>,
    AuthenticatedUser { user_id }: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTodoRequest>,
) -> ApiResult<impl IntoResponse> {
    let mut todo = state
        .todo_repo
        .find_by_id(id, user_id)
        .await?
        .ok_or(TodoError::TodoNotFound { id })?;

    if let Some(title) = request.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(ApiError::BadRequest("标题不能为空".to_string()));
        }
        todo.title = title;
    }
    if let Some(description) = request.description {
        todo.description = description;
    }
    if request.clear_due_date {
        todo.due_date = None;
        todo.next_notify_at = None;
    } else if let Some(due_date) = request.due_date {
        todo.due_date = Some(due_date);
        todo.next_notify_at = None;
    }
    if let Some(priority) = request.priority {
        todo.priority = priority;
    }
    if let Some(completed) = request.completed {
        todo.completed = completed;
        if completed {
            todo.next_notify_at = None;
        }
    }
    if let Some(enabled) = request.notify_enabled {
        todo.notify_enabled = enabled;
        todo.next_notify_at = None;
    }
    if let Some(frequency) = request.notify_frequency_minutes {
        validate_frequency(frequency)?;
        todo.notify_frequency_minutes = frequency;
        todo.next_notify_at = None;
    }
    if let Some(enabled) = request.telegram_enabled {
        todo.telegram_enabled = enabled;
    }
    if let Some(enabled) = request.discord_enabled {
        todo.discord_enabled = enabled;
    }
    todo.updated_at = Utc::now();

    let todo = state.todo_repo.update(&todo).await?;
    Ok(success(todo))
}

/// 删除待办事项
pub async fn delete_todo(
    State(state): State<AppState>,
    AuthenticatedUser { user_id }: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    if !state.todo_repo.delete(id, user_id).await? {
        return Err(TodoError::TodoNotFound { id }.into());
    }
    info!("删除待办事项: {}", id);
    Ok(no_content())
}

/// 标记完成，同时清空提醒定时器
pub async fn complete_todo(
    State(state): State<AppState>,
    AuthenticatedUser { user_id }: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let todo = state
        .todo_repo
        .mark_completed(id, user_id, Utc::now())
        .await?
        .ok_or(TodoError::TodoNotFound { id })?;
    info!("完成待办事项: {} ({})", todo.title, todo.id);
    Ok(success(todo))
}

/// 批量调整排序
pub async fn reorder_todos(
    State(state): State<AppState>,
    AuthenticatedUser { user_id }: AuthenticatedUser,
    Json(request): Json<ReorderRequest>,
) -> ApiResult<impl IntoResponse> {
    if request.items.is_empty() {
        return Err(ApiError::BadRequest("排序列表不能为空".to_string()));
    }

    let entries: Vec<ReorderEntry> = request
        .items
        .into_iter()
        .map(|item| ReorderEntry {
            id: item.id,
            index: item.index,
        })
        .collect();

    state.todo_repo.reorder(user_id, &entries).await?;
    Ok(ApiResponse::success_empty())
}
