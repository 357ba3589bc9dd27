/// Storage-related errors for todo CRUD operations.
#[derive(Debug)]
pub enum StoreError {
    /// The draft failed schema validation. Carries the first violated
    /// field's message only.
    Validation(String),

    /// The requested todo does not exist for the caller. True absence and
    /// foreign ownership are indistinguishable here.
    NotFound,

    /// A conditional write found no item matching id and owner. Same
    /// opacity as `NotFound`: absence and foreign ownership look alike.
    ConditionFailed,

    /// The table backend failed; carries the backend's message verbatim.
    Backend(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Validation(msg) => write!(f, "{msg}"),
            StoreError::NotFound => write!(f, "Todo not found"),
            StoreError::ConditionFailed => write!(f, "Conditional write failed"),
            StoreError::Backend(msg) => write!(f, "Table backend error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}
