/// Todo endpoints
///
/// All routes require authentication and only ever see the caller's todos.
/// A todo id that is malformed, unknown, or owned by another user yields a
/// bodiless 404.
///
/// # Endpoints
///
/// - `POST /todos` - Create a todo
/// - `GET /todos` - List the caller's todos
/// - `GET /todos/:id` - Fetch one todo
/// - `PATCH /todos/:id` - Update text and/or completion
/// - `DELETE /todos/:id` - Delete a todo, returning it

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use todolist_shared::{
    auth::authenticator::AuthContext,
    models::todo::{CreateTodo, Todo, UpdateTodo},
    todos::parse_todo_id,
};

/// Single-todo response
#[derive(Debug, Serialize, Deserialize)]
pub struct TodoResponse {
    pub todo: Todo,
}

/// Todo list response
#[derive(Debug, Serialize, Deserialize)]
pub struct TodosResponse {
    pub todos: Vec<Todo>,
}

/// Create todo handler
///
/// # Request
///
/// ```json
/// { "text": "Buy milk" }
/// ```
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> ApiResult<Json<TodoResponse>> {
    let Json(request) = payload?;

    let todo = state.todos.create(context.user.id, request).await?;

    Ok(Json(TodoResponse { todo }))
}

/// List todos handler
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
) -> ApiResult<Json<TodosResponse>> {
    let todos = state.todos.list(context.user.id).await?;

    Ok(Json(TodosResponse { todos }))
}

/// Get todo handler
pub async fn get_todo(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<TodoResponse>> {
    let todo = state.todos.get(context.user.id, &id).await?;

    Ok(Json(TodoResponse { todo }))
}

/// Update todo handler
///
/// # Request
///
/// ```json
/// { "text": "Buy oat milk", "completed": true }
/// ```
///
/// Both fields are optional and a missing body counts as `{}`. Omitting
/// `completed` marks the todo incomplete. The id is checked before the body
/// is decoded, so a malformed id is always 404.
pub async fn update_todo(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<TodoResponse>> {
    if parse_todo_id(&id).is_none() {
        return Err(ApiError::NotFound);
    }

    let request = decode_update(&body)?;
    let todo = state.todos.update(context.user.id, &id, request).await?;

    Ok(Json(TodoResponse { todo }))
}

fn decode_update(body: &[u8]) -> ApiResult<UpdateTodo> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(UpdateTodo::default());
    }

    serde_json::from_slice(body).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail::new("body", e.to_string())])
    })
}

/// Delete todo handler
pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<TodoResponse>> {
    let todo = state.todos.delete(context.user.id, &id).await?;

    Ok(Json(TodoResponse { todo }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_update_empty_body_is_default() {
        for body in [&b""[..], &b"  \n"[..]] {
            let update = decode_update(body).unwrap();
            assert_eq!(update.text, None);
            assert_eq!(update.completed, None);
        }
    }

    #[test]
    fn test_decode_update_rejects_malformed_json() {
        assert!(matches!(
            decode_update(b"{not json"),
            Err(ApiError::ValidationError(_))
        ));
        assert!(matches!(
            decode_update(br#"{"completed":"yes"}"#),
            Err(ApiError::ValidationError(_))
        ));
        assert_eq!(
            decode_update(br#"{"completed":true}"#).unwrap().completed,
            Some(true)
        );
    }
}
