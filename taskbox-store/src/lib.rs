pub mod error;
pub mod model;
pub mod store;
pub mod table;

// Re-export primary public types for convenience.
pub use error::StoreError;
pub use model::{first_violation, Priority, Status, TodoDraft, TodoItem};
pub use store::TodoStore;
pub use table::{MemoryTable, TableError, TodoTable};
