use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use garde::Validate;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{first_violation, TodoDraft, TodoItem};
use crate::table::{TodoTable, TodoTableErased};

/// Owner-scoped CRUD over a pluggable table backend.
///
/// Every operation is keyed by the verified owner id; items belonging to
/// other owners are invisible and immutable through this type. Each
/// operation issues exactly one backend call and surfaces failures
/// immediately, without retries.
pub struct TodoStore {
    table: Arc<dyn TodoTableErased>,
}

impl TodoStore {
    pub fn new(table: impl TodoTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    /// Validate the draft and persist a new todo for `owner`.
    ///
    /// The id is a fresh UUID v4; `created_at` and `updated_at` start
    /// equal.
    pub async fn create(&self, owner: &str, draft: TodoDraft) -> Result<TodoItem, StoreError> {
        draft
            .validate()
            .map_err(|report| StoreError::Validation(first_violation(&report)))?;

        let now = now_rfc3339();
        let item = TodoItem {
            id: Uuid::new_v4().to_string(),
            user_id: owner.to_string(),
            title: draft.title,
            description: draft.description,
            status: draft.status,
            due_date: draft.due_date,
            priority: draft.priority,
            created_at: now.clone(),
            updated_at: now,
        };

        self.table.put_item(&item).await?;
        debug!(owner = %owner, id = %item.id, "Todo created");
        Ok(item)
    }

    /// All of `owner`'s todos, materialized in full.
    pub async fn list(&self, owner: &str) -> Result<Vec<TodoItem>, StoreError> {
        let items = self.table.scan_owner(owner).await?;
        debug!(owner = %owner, count = items.len(), "Todos listed");
        Ok(items)
    }

    /// A single todo by id. An item that does not exist and an item owned
    /// by someone else produce the same `NotFound`.
    pub async fn get(&self, owner: &str, id: &str) -> Result<TodoItem, StoreError> {
        match self.table.get_item(id).await? {
            Some(item) if item.user_id == owner => Ok(item),
            _ => Err(StoreError::NotFound),
        }
    }

    /// Validate the draft and replace the todo's caller-supplied fields.
    ///
    /// Conditional on id and owner matching; `created_at` is preserved and
    /// `updated_at` refreshed. Returns the new image.
    pub async fn update(
        &self,
        owner: &str,
        id: &str,
        draft: TodoDraft,
    ) -> Result<TodoItem, StoreError> {
        draft
            .validate()
            .map_err(|report| StoreError::Validation(first_violation(&report)))?;

        let item = self
            .table
            .update_item(id, owner, &draft, &now_rfc3339())
            .await?;
        debug!(owner = %owner, id = %id, "Todo updated");
        Ok(item)
    }

    /// Delete the todo, conditional on id and owner matching.
    pub async fn delete(&self, owner: &str, id: &str) -> Result<(), StoreError> {
        self.table.delete_item(id, owner).await?;
        debug!(owner = %owner, id = %id, "Todo deleted");
        Ok(())
    }
}

/// Millisecond-precision UTC timestamp, e.g. `2026-08-26T12:34:56.789Z`.
fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::now_rfc3339;

    #[test]
    fn timestamps_are_utc_with_milliseconds() {
        let ts = now_rfc3339();
        assert!(ts.ends_with('Z'));
        // 2026-08-26T12:34:56.789Z
        assert_eq!(ts.len(), 24);
    }
}
