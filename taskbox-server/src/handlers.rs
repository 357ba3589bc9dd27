use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;
use tracing::warn;

use taskbox_store::{StoreError, TodoDraft};

use crate::identity::Caller;
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /todos
pub(crate) async fn create_todo(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    body: Result<Json<TodoDraft>, JsonRejection>,
) -> ApiResponse {
    let draft = match body {
        Ok(Json(draft)) => draft,
        Err(rejection) => return bad_body(rejection),
    };

    match state.todos.create(caller.subject(), draft).await {
        Ok(item) => ApiResponse::ok("Todo created successfully", json!(item)),
        Err(err) => store_failure(err, "Failed to create todo"),
    }
}

/// GET /todos
pub(crate) async fn list_todos(
    State(state): State<Arc<AppState>>,
    caller: Caller,
) -> ApiResponse {
    match state.todos.list(caller.subject()).await {
        Ok(items) => ApiResponse::ok("Todos retrieved successfully", json!(items)),
        Err(err) => store_failure(err, "Failed to get todos"),
    }
}

/// GET /todos/{id}
pub(crate) async fn get_todo(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResponse {
    match state.todos.get(caller.subject(), &id).await {
        Ok(item) => ApiResponse::ok("Todo retrieved successfully", json!(item)),
        Err(err) => store_failure(err, "Failed to get todo"),
    }
}

/// PUT /todos/{id}
pub(crate) async fn update_todo(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
    body: Result<Json<TodoDraft>, JsonRejection>,
) -> ApiResponse {
    let draft = match body {
        Ok(Json(draft)) => draft,
        Err(rejection) => return bad_body(rejection),
    };

    match state.todos.update(caller.subject(), &id, draft).await {
        Ok(item) => ApiResponse::ok("Todo updated successfully", json!(item)),
        Err(err) => store_failure(err, "Failed to update todo"),
    }
}

/// DELETE /todos/{id}
pub(crate) async fn delete_todo(
    State(state): State<Arc<AppState>>,
    caller: Caller,
    Path(id): Path<String>,
) -> ApiResponse {
    match state.todos.delete(caller.subject(), &id).await {
        Ok(()) => ApiResponse::ok("Todo deleted successfully", json!({})),
        Err(err) => store_failure(err, "Todo id is required or is already deleted"),
    }
}

/// GET /health
pub(crate) async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

fn bad_body(rejection: JsonRejection) -> ApiResponse {
    ApiResponse::status(StatusCode::BAD_REQUEST, rejection.body_text(), json!({}))
}

/// Map a store failure onto the envelope contract.
///
/// Validation answers 400 with the single violated-field message, an
/// invisible item answers 404, and everything else answers 500 with the
/// operation's fixed message plus the underlying error.
fn store_failure(err: StoreError, failure_message: &'static str) -> ApiResponse {
    match err {
        StoreError::Validation(msg) => ApiResponse::status(StatusCode::BAD_REQUEST, msg, json!({})),
        StoreError::NotFound => {
            ApiResponse::status(StatusCode::NOT_FOUND, "Todo not found", json!({}))
        }
        other => {
            warn!(error = %other, "Store operation failed");
            ApiResponse::status(
                StatusCode::INTERNAL_SERVER_ERROR,
                failure_message,
                json!({ "error": other.to_string() }),
            )
        }
    }
}
