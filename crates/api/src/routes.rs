use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

use todo_domain::TodoRepository;

use crate::{
    auth::{require_auth, AdminCredentials, JwtService},
    handlers::{
        auth::login,
        health::health_check,
        todos::{
            complete_todo, create_todo, delete_todo, get_todo, list_todos, reorder_todos,
            update_todo,
        },
    },
    middleware::{cors_layer, request_logging, trace_layer},
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub todo_repo: Arc<dyn TodoRepository>,
    pub jwt: Arc<JwtService>,
    pub admin: Arc<AdminCredentials>,
}

/// 创建API应用
///
/// `/api/todos`下的所有路由都要求Bearer令牌，登录与健康检查除外。
pub fn create_app(state: AppState, cors_enabled: bool) -> Router {
    let protected = Router::new()
        .route("/", get(list_todos).post(create_todo))
        .route("/reorder", patch(reorder_todos))
        .route(
            "/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/{id}/complete", post(complete_todo))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/login", post(login))
        .nest("/api/todos", protected)
        .layer(from_fn(request_logging))
        .layer(trace_layer())
        .with_state(state);

    if cors_enabled {
        app = app.layer(cors_layer());
    }

    app
}
