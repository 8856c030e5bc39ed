#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use todo_api::{
        auth::{AdminCredentials, JwtService},
        create_app, AppState,
    };
    use todo_testing_utils::{MockTodoRepository, TodoBuilder};

    const ADMIN_ID: &str = "11111111-1111-1111-1111-111111111111";

    fn build_app(repo: MockTodoRepository) -> (Router, String) {
        let jwt = Arc::new(JwtService::new("test-secret", 24));
        let admin_id = Uuid::parse_str(ADMIN_ID).unwrap();
        let token = jwt.generate_token(admin_id).unwrap();

        let state = AppState {
            todo_repo: Arc::new(repo),
            jwt,
            admin: Arc::new(AdminCredentials {
                username: "admin".to_string(),
                password: "admin123".to_string(),
                user_id: admin_id,
            }),
        };
        (create_app(state, false), token)
    }

    fn admin_id() -> Uuid {
        Uuid::parse_str(ADMIN_ID).unwrap()
    }

    fn json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_login_issues_token() {
        let (app, _) = build_app(MockTodoRepository::default());

        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"username": "admin", "password": "admin123"}).to_string(),
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["success"], json!(true));
        assert!(body["data"]["token"].as_str().is_some());
        assert_eq!(body["data"]["expires_in"], json!(24 * 3600));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() {
        let (app, _) = build_app(MockTodoRepository::default());

        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"username": "admin", "password": "wrong"}).to_string(),
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = read_json(response).await;
        assert_eq!(body["success"], json!(false));
    }

    #[tokio::test]
    async fn test_todos_require_bearer_token() {
        let (app, _) = build_app(MockTodoRepository::default());

        let request = Request::builder()
            .method("GET")
            .uri("/api/todos")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .method("GET")
            .uri("/api/todos")
            .header(header::AUTHORIZATION, "Bearer not-a-token")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_todo_applies_defaults() {
        let (app, token) = build_app(MockTodoRepository::default());

        let request = json_request("POST", "/api/todos", &token, json!({"title": "买牛奶"}));
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = read_json(response).await;
        assert_eq!(body["data"]["title"], json!("买牛奶"));
        assert_eq!(body["data"]["priority"], json!("medium"));
        assert_eq!(body["data"]["notify_enabled"], json!(true));
        assert_eq!(body["data"]["notify_frequency_minutes"], json!(60));
        assert_eq!(body["data"]["completed"], json!(false));
        assert!(body["data"]["next_notify_at"].is_null());
    }

    #[tokio::test]
    async fn test_create_todo_rejects_blank_title() {
        let (app, token) = build_app(MockTodoRepository::default());

        let request = json_request("POST", "/api/todos", &token, json!({"title": "   "}));
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_duplicate_title_conflicts() {
        let existing = TodoBuilder::new()
            .with_user_id(admin_id())
            .with_title("买牛奶")
            .build();
        let (app, token) = build_app(MockTodoRepository::with_todos(vec![existing]));

        let request = json_request("POST", "/api/todos", &token, json!({"title": "买牛奶"}));
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = read_json(response).await;
        assert_eq!(body["error"]["type"], json!("DUPLICATE_TITLE"));
    }

    #[tokio::test]
    async fn test_list_is_scoped_to_authenticated_user() {
        let mine = TodoBuilder::new()
            .with_user_id(admin_id())
            .with_title("我的任务")
            .build();
        let other = TodoBuilder::new().with_title("别人的任务").build();
        let (app, token) = build_app(MockTodoRepository::with_todos(vec![mine, other]));

        let response = app
            .oneshot(get_request("/api/todos", &token))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        let items = body["data"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], json!("我的任务"));
    }

    #[tokio::test]
    async fn test_list_filters_by_completed() {
        let open = TodoBuilder::new()
            .with_user_id(admin_id())
            .with_title("未完成")
            .build();
        let done = TodoBuilder::new()
            .with_user_id(admin_id())
            .with_title("已完成")
            .completed()
            .build();
        let (app, token) = build_app(MockTodoRepository::with_todos(vec![open, done]));

        let response = app
            .oneshot(get_request("/api/todos?completed=true", &token))
            .await
            .unwrap();

        let body = read_json(response).await;
        let items = body["data"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["title"], json!("已完成"));
    }

    #[tokio::test]
    async fn test_get_missing_todo_returns_404() {
        let (app, token) = build_app(MockTodoRepository::default());

        let uri = format!("/api/todos/{}", Uuid::new_v4());
        let response = app.oneshot(get_request(&uri, &token)).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = read_json(response).await;
        assert_eq!(body["error"]["type"], json!("TODO_NOT_FOUND"));
    }

    #[tokio::test]
    async fn test_update_toggle_notify_resets_timer() {
        let todo = TodoBuilder::new()
            .with_user_id(admin_id())
            .with_next_notify_at(Utc::now() + Duration::minutes(30))
            .build();
        let id = todo.id;
        let (app, token) = build_app(MockTodoRepository::with_todos(vec![todo]));

        let uri = format!("/api/todos/{id}");
        let request = json_request("PUT", &uri, &token, json!({"notify_enabled": false}));
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["data"]["notify_enabled"], json!(false));
        assert!(body["data"]["next_notify_at"].is_null());
    }

    #[tokio::test]
    async fn test_complete_clears_timer() {
        let todo = TodoBuilder::new()
            .with_user_id(admin_id())
            .with_next_notify_at(Utc::now() + Duration::minutes(5))
            .build();
        let id = todo.id;
        let (app, token) = build_app(MockTodoRepository::with_todos(vec![todo]));

        let uri = format!("/api/todos/{id}/complete");
        let request = json_request("POST", &uri, &token, json!({}));
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["data"]["completed"], json!(true));
        assert!(body["data"]["next_notify_at"].is_null());
    }

    #[tokio::test]
    async fn test_delete_todo() {
        let todo = TodoBuilder::new().with_user_id(admin_id()).build();
        let id = todo.id;
        let (app, token) = build_app(MockTodoRepository::with_todos(vec![todo]));

        let uri = format!("/api/todos/{id}");
        let request = Request::builder()
            .method("DELETE")
            .uri(&uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // 再次删除返回404
        let request = Request::builder()
            .method("DELETE")
            .uri(&uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reorder_rejects_empty_list() {
        let (app, token) = build_app(MockTodoRepository::default());

        let request = json_request("PATCH", "/api/todos/reorder", &token, json!({"items": []}));
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reorder_updates_order() {
        let first = TodoBuilder::new()
            .with_user_id(admin_id())
            .with_title("第一项")
            .build();
        let second = TodoBuilder::new()
            .with_user_id(admin_id())
            .with_title("第二项")
            .build();
        let (first_id, second_id) = (first.id, second.id);
        let (app, token) = build_app(MockTodoRepository::with_todos(vec![first, second]));

        let request = json_request(
            "PATCH",
            "/api/todos/reorder",
            &token,
            json!({"items": [
                {"id": first_id, "index": 2},
                {"id": second_id, "index": 1},
            ]}),
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(get_request("/api/todos", &token))
            .await
            .unwrap();
        let body = read_json(response).await;
        let items = body["data"].as_array().unwrap();
        assert_eq!(items[0]["title"], json!("第二项"));
        assert_eq!(items[1]["title"], json!("第一项"));
    }
}
