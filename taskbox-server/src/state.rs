use std::sync::Arc;

use taskbox_auth::AuthorizationGate;
use taskbox_store::TodoStore;

/// Shared state for the HTTP layer.
pub struct AppState {
    pub gate: Arc<AuthorizationGate>,
    pub todos: Arc<TodoStore>,
}

impl AppState {
    pub fn new(gate: AuthorizationGate, todos: TodoStore) -> Arc<Self> {
        Arc::new(Self {
            gate: Arc::new(gate),
            todos: Arc::new(todos),
        })
    }
}
