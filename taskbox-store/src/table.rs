use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use dashmap::{DashMap, Entry};

use crate::error::StoreError;
use crate::model::{TodoDraft, TodoItem};

/// Errors surfaced by a table backend.
#[derive(Debug)]
pub enum TableError {
    /// A conditional write's predicate (item exists and owner matches) did
    /// not hold.
    ConditionFailed,

    /// Backend failure, with the backend's own message.
    Backend(String),
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::ConditionFailed => write!(f, "Conditional check failed"),
            TableError::Backend(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for TableError {}

impl From<TableError> for StoreError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::ConditionFailed => StoreError::ConditionFailed,
            TableError::Backend(msg) => StoreError::Backend(msg),
        }
    }
}

/// Pluggable single-table backend for todos.
///
/// Implement this trait to back the store with external storage. The
/// conditional operations must be atomic per item: the exists-and-owner
/// predicate and the write happen as one step.
pub trait TodoTable: Send + Sync + 'static {
    /// Insert an item unconditionally.
    fn put_item(&self, item: &TodoItem) -> impl Future<Output = Result<(), TableError>> + Send;

    /// Fetch an item by id, regardless of owner.
    fn get_item(&self, id: &str)
        -> impl Future<Output = Result<Option<TodoItem>, TableError>> + Send;

    /// All items owned by `user_id`. Must observe every previously
    /// acknowledged write for that owner.
    fn scan_owner(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<TodoItem>, TableError>> + Send;

    /// Replace the draft field set of the item with `id`, provided it
    /// exists and is owned by `user_id`. Absent optional fields clear the
    /// stored values. Returns the new image.
    fn update_item(
        &self,
        id: &str,
        user_id: &str,
        draft: &TodoDraft,
        updated_at: &str,
    ) -> impl Future<Output = Result<TodoItem, TableError>> + Send;

    /// Delete the item with `id`, provided it exists and is owned by
    /// `user_id`.
    fn delete_item(
        &self,
        id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<(), TableError>> + Send;
}

/// Object-safe wrapper for `TodoTable`.
pub(crate) trait TodoTableErased: Send + Sync {
    fn put_item<'a>(
        &'a self,
        item: &'a TodoItem,
    ) -> Pin<Box<dyn Future<Output = Result<(), TableError>> + Send + 'a>>;
    fn get_item<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<TodoItem>, TableError>> + Send + 'a>>;
    fn scan_owner<'a>(
        &'a self,
        user_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<TodoItem>, TableError>> + Send + 'a>>;
    fn update_item<'a>(
        &'a self,
        id: &'a str,
        user_id: &'a str,
        draft: &'a TodoDraft,
        updated_at: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<TodoItem, TableError>> + Send + 'a>>;
    fn delete_item<'a>(
        &'a self,
        id: &'a str,
        user_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), TableError>> + Send + 'a>>;
}

impl<T: TodoTable> TodoTableErased for T {
    fn put_item<'a>(
        &'a self,
        item: &'a TodoItem,
    ) -> Pin<Box<dyn Future<Output = Result<(), TableError>> + Send + 'a>> {
        Box::pin(TodoTable::put_item(self, item))
    }

    fn get_item<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<TodoItem>, TableError>> + Send + 'a>> {
        Box::pin(TodoTable::get_item(self, id))
    }

    fn scan_owner<'a>(
        &'a self,
        user_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<TodoItem>, TableError>> + Send + 'a>> {
        Box::pin(TodoTable::scan_owner(self, user_id))
    }

    fn update_item<'a>(
        &'a self,
        id: &'a str,
        user_id: &'a str,
        draft: &'a TodoDraft,
        updated_at: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<TodoItem, TableError>> + Send + 'a>> {
        Box::pin(TodoTable::update_item(self, id, user_id, draft, updated_at))
    }

    fn delete_item<'a>(
        &'a self,
        id: &'a str,
        user_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), TableError>> + Send + 'a>> {
        Box::pin(TodoTable::delete_item(self, id, user_id))
    }
}

/// In-memory table for development and testing.
///
/// Conditional operations go through the entry API, which locks the item's
/// slot for the duration of the check-and-write.
pub struct MemoryTable {
    items: Arc<DashMap<String, TodoItem>>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self {
            items: Arc::new(DashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for MemoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoTable for MemoryTable {
    fn put_item(&self, item: &TodoItem) -> impl Future<Output = Result<(), TableError>> + Send {
        self.items.insert(item.id.clone(), item.clone());
        async move { Ok(()) }
    }

    fn get_item(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<TodoItem>, TableError>> + Send {
        let result = self.items.get(id).map(|entry| entry.value().clone());
        async move { Ok(result) }
    }

    fn scan_owner(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<TodoItem>, TableError>> + Send {
        let result = self
            .items
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        async move { Ok(result) }
    }

    fn update_item(
        &self,
        id: &str,
        user_id: &str,
        draft: &TodoDraft,
        updated_at: &str,
    ) -> impl Future<Output = Result<TodoItem, TableError>> + Send {
        let result = match self.items.entry(id.to_string()) {
            Entry::Occupied(mut occupied) if occupied.get().user_id == user_id => {
                let current = occupied.get();
                let updated = TodoItem {
                    id: current.id.clone(),
                    user_id: current.user_id.clone(),
                    title: draft.title.clone(),
                    description: draft.description.clone(),
                    status: draft.status,
                    due_date: draft.due_date.clone(),
                    priority: draft.priority,
                    created_at: current.created_at.clone(),
                    updated_at: updated_at.to_string(),
                };
                occupied.insert(updated.clone());
                Ok(updated)
            }
            _ => Err(TableError::ConditionFailed),
        };
        async move { result }
    }

    fn delete_item(
        &self,
        id: &str,
        user_id: &str,
    ) -> impl Future<Output = Result<(), TableError>> + Send {
        let result = match self.items.entry(id.to_string()) {
            Entry::Occupied(occupied) if occupied.get().user_id == user_id => {
                occupied.remove();
                Ok(())
            }
            _ => Err(TableError::ConditionFailed),
        };
        async move { result }
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryTable, TableError, TodoTable};
    use crate::model::{Status, TodoDraft, TodoItem};

    fn item(id: &str, user_id: &str) -> TodoItem {
        TodoItem {
            id: id.into(),
            user_id: user_id.into(),
            title: "Buy milk".into(),
            description: "Need two liters".into(),
            status: Some(Status::Active),
            due_date: Some("2026-09-01".into()),
            priority: None,
            created_at: "2026-01-01T00:00:00.000Z".into(),
            updated_at: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    fn draft(title: &str) -> TodoDraft {
        TodoDraft {
            title: title.into(),
            description: "Need two liters".into(),
            ..TodoDraft::default()
        }
    }

    #[tokio::test]
    async fn update_requires_matching_owner() {
        let table = MemoryTable::new();
        table.put_item(&item("t-1", "alice")).await.unwrap();

        let err = table
            .update_item("t-1", "bob", &draft("Hijacked"), "2026-01-02T00:00:00.000Z")
            .await
            .unwrap_err();
        assert!(matches!(err, TableError::ConditionFailed));

        // The item is untouched.
        let stored = table.get_item("t-1").await.unwrap().unwrap();
        assert_eq!(stored.title, "Buy milk");
    }

    #[tokio::test]
    async fn update_replaces_the_draft_field_set() {
        let table = MemoryTable::new();
        table.put_item(&item("t-1", "alice")).await.unwrap();

        // The draft carries no status and no due date; both must clear.
        let updated = table
            .update_item("t-1", "alice", &draft("Buy bread"), "2026-01-02T00:00:00.000Z")
            .await
            .unwrap();

        assert_eq!(updated.title, "Buy bread");
        assert_eq!(updated.status, None);
        assert_eq!(updated.due_date, None);
        assert_eq!(updated.created_at, "2026-01-01T00:00:00.000Z");
        assert_eq!(updated.updated_at, "2026-01-02T00:00:00.000Z");
        assert_eq!(table.get_item("t-1").await.unwrap().unwrap(), updated);
    }

    #[tokio::test]
    async fn update_missing_item_is_a_condition_failure() {
        let table = MemoryTable::new();
        let err = table
            .update_item("nope", "alice", &draft("Buy bread"), "2026-01-02T00:00:00.000Z")
            .await
            .unwrap_err();
        assert!(matches!(err, TableError::ConditionFailed));
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn delete_requires_matching_owner() {
        let table = MemoryTable::new();
        table.put_item(&item("t-1", "alice")).await.unwrap();

        let err = table.delete_item("t-1", "bob").await.unwrap_err();
        assert!(matches!(err, TableError::ConditionFailed));
        assert_eq!(table.len(), 1);

        table.delete_item("t-1", "alice").await.unwrap();
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn scan_owner_filters_by_owner() {
        let table = MemoryTable::new();
        table.put_item(&item("t-1", "alice")).await.unwrap();
        table.put_item(&item("t-2", "alice")).await.unwrap();
        table.put_item(&item("t-3", "bob")).await.unwrap();

        let mut ids: Vec<String> = table
            .scan_owner("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["t-1", "t-2"]);
    }
}
