use std::sync::Arc;

use axum::middleware;
use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::identity;
use crate::state::AppState;

/// Assemble the application router.
///
/// The gate layer guards the `/todos` subtree; `/health` stays open.
pub fn routes(state: Arc<AppState>) -> Router {
    let todos = Router::new()
        .route("/todos", get(handlers::list_todos).post(handlers::create_todo))
        .route(
            "/todos/{id}",
            get(handlers::get_todo)
                .put(handlers::update_todo)
                .delete(handlers::delete_todo),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            identity::gate_layer,
        ));

    Router::new()
        .merge(todos)
        .route("/health", get(handlers::health))
        .with_state(state)
}
