use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use cookie::Cookie;
use tracing::info;

use crate::{
    error::AppError,
    model::{CurrentUser, StatusFilter},
    schema::{CreateTodoSchema, ListTodosQuery, TodoListResponse, TodoResponse},
    AppState,
};

// Handler for the health checker route
pub async fn health_checker_handler() -> impl IntoResponse {
    const MESSAGE: &str = "Todo API with Rust, SQLx, SQLite, and Axum";

    let json_response = serde_json::json!({
        "status": "success",
        "message": MESSAGE
    });

    Json(json_response)
}

// Handler for listing the caller's Todo items
pub async fn get_todos(
    State(data): State<Arc<AppState>>,
    user: CurrentUser,
    query: Result<Query<ListTodosQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    let filter = StatusFilter::from_query(query.status.as_deref())?;
    let todos = data.todos.list(&user, filter).await?;

    Ok((StatusCode::OK, Json(TodoListResponse { todos })))
}

// Handler for creating a new Todo owned by the caller
pub async fn create_todo(
    State(data): State<Arc<AppState>>,
    user: CurrentUser,
    body: Result<Json<CreateTodoSchema>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    let todo = data.todos.create(&user, body.name).await?;
    info!(todo_id = %todo.id, user_id = %user.id(), "todo created");

    Ok((StatusCode::CREATED, Json(TodoResponse { todo })))
}

// Handler for getting a specific Todo by ID
pub async fn get_todo(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let todo = data.todos.get(&user, &id).await?;

    Ok((StatusCode::OK, Json(TodoResponse { todo })))
}

// Handler for deleting a Todo by ID
pub async fn delete_todo(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    data.todos.delete(&user, &id).await?;
    info!(todo_id = %id, user_id = %user.id(), "todo deleted");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn complete_todo(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let todo = data.todos.complete(&user, &id).await?;

    Ok((StatusCode::OK, Json(TodoResponse { todo })))
}

pub async fn incomplete_todo(
    Path(id): Path<String>,
    State(data): State<Arc<AppState>>,
    user: CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let todo = data.todos.incomplete(&user, &id).await?;

    Ok((StatusCode::OK, Json(TodoResponse { todo })))
}

// Revokes the caller's session and expires the session cookie
pub async fn sign_out(
    State(data): State<Arc<AppState>>,
    user: CurrentUser,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    data.identity.revoke(&headers).await?;
    info!(user_id = %user.id(), "signed out");

    let mut response_headers = HeaderMap::new();
    if let Some(name) = data.identity.session_cookie() {
        let mut expired = Cookie::build((name.to_owned(), "")).path("/").build();
        expired.make_removal();
        if let Ok(value) = HeaderValue::from_str(&expired.to_string()) {
            response_headers.insert(SET_COOKIE, value);
        }
    }

    Ok((StatusCode::NO_CONTENT, response_headers))
}
