//! Todo endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::http::error::ApiError;
use crate::http::extractors::{TodoId, ValidJson};
use crate::http::server::AppState;
use crate::models::{CreateTodoRequest, Todo, UpdateTodoRequest};

/// GET /todos - list all todos, ascending by id
async fn list_todos(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Todo>>, ApiError> {
    let todos = state.todos.list().await?;
    Ok(Json(todos))
}

/// POST /todos - create a todo
async fn create_todo(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<CreateTodoRequest>,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let todo = state.todos.create(req).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// GET /todos/{id} - get a single todo
async fn get_todo(
    State(state): State<Arc<AppState>>,
    TodoId(id): TodoId,
) -> Result<Json<Todo>, ApiError> {
    state
        .todos
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::todo_not_found(id))
}

/// PUT /todos/{id} - partial update
async fn update_todo(
    State(state): State<Arc<AppState>>,
    TodoId(id): TodoId,
    ValidJson(req): ValidJson<UpdateTodoRequest>,
) -> Result<Json<Todo>, ApiError> {
    state
        .todos
        .update(id, req)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::todo_not_found(id))
}

/// DELETE /todos/{id}
async fn delete_todo(
    State(state): State<Arc<AppState>>,
    TodoId(id): TodoId,
) -> Result<StatusCode, ApiError> {
    if state.todos.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::todo_not_found(id))
    }
}

/// Todo routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseConfig, PoolConfig};
    use crate::db::open_store;
    use crate::service::TodoService;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    async fn app() -> (Router, TempDir) {
        let dir = TempDir::new().unwrap();
        let config = DatabaseConfig::Sqlite {
            path: dir.path().join("todos.db"),
        };
        let store = open_store(&config, &PoolConfig::default()).unwrap();
        store.initialize_schema().await.unwrap();
        let state = Arc::new(AppState {
            todos: TodoService::new(store),
        });
        (router().with_state(state), dir)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                req = req.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn create_returns_201_with_defaults() {
        let (app, _dir) = app().await;
        let (status, body) = send(&app, "POST", "/todos", Some(json!({"title": "Buy milk"}))).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            body,
            json!({"id": 1, "title": "Buy milk", "description": "", "status": "pending"})
        );
    }

    #[tokio::test]
    async fn create_without_title_is_400() {
        let (app, _dir) = app().await;
        let (status, body) = send(&app, "POST", "/todos", Some(json!({"description": "x"}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn create_with_bad_status_is_400() {
        let (app, _dir) = app().await;
        let (status, _) = send(
            &app,
            "POST",
            "/todos",
            Some(json!({"title": "x", "status": "archived"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, list) = send(&app, "GET", "/todos", None).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let (app, _dir) = app().await;
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/todos")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wrongly_typed_field_is_400() {
        let (app, _dir) = app().await;
        let (status, _) = send(&app, "POST", "/todos", Some(json!({"title": 5}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_missing_id_is_404() {
        let (app, _dir) = app().await;
        let (status, body) = send(&app, "PUT", "/todos/42", Some(json!({"title": "x"}))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn update_with_bad_status_is_400() {
        let (app, _dir) = app().await;
        send(&app, "POST", "/todos", Some(json!({"title": "x"}))).await;

        let (status, _) = send(&app, "PUT", "/todos/1", Some(json!({"status": "later"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, todo) = send(&app, "GET", "/todos/1", None).await;
        assert_eq!(todo["status"], "pending");
    }

    #[tokio::test]
    async fn non_integer_id_is_404() {
        let (app, _dir) = app().await;
        let (status, _) = send(&app, "DELETE", "/todos/abc", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn signed_id_is_404() {
        let (app, _dir) = app().await;
        send(&app, "POST", "/todos", Some(json!({"title": "x"}))).await;

        let (status, _) = send(&app, "GET", "/todos/1", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, "GET", "/todos/+1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "DELETE", "/todos/-1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_twice_is_204_then_404() {
        let (app, _dir) = app().await;
        send(&app, "POST", "/todos", Some(json!({"title": "x"}))).await;

        let (status, body) = send(&app, "DELETE", "/todos/1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) = send(&app, "DELETE", "/todos/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
