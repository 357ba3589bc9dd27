use garde::Validate;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a todo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Completed,
    Pending,
}

/// Priority of a todo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// A stored todo, as persisted and as returned on the wire.
///
/// `id`, `user_id` and `created_at` are assigned once and never change;
/// `updated_at` is refreshed on every update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    pub created_at: String,
    pub updated_at: String,
}

/// The caller-supplied field set for create and update.
///
/// Validation is fail-fast: the first violated field produces the single
/// error message callers see. Length thresholds count characters, not
/// bytes. The enum fields need no validator; foreign values are rejected
/// during deserialization.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TodoDraft {
    #[serde(default)]
    #[garde(custom(title_rules))]
    pub title: String,
    #[serde(default)]
    #[garde(custom(description_rules))]
    pub description: String,
    #[serde(default)]
    #[garde(skip)]
    pub status: Option<Status>,
    #[serde(default)]
    #[garde(skip)]
    pub due_date: Option<String>,
    #[serde(default)]
    #[garde(skip)]
    pub priority: Option<Priority>,
}

fn title_rules(value: &str, _context: &()) -> garde::Result {
    if value.is_empty() {
        return Err(garde::Error::new("Title is required"));
    }
    if value.chars().count() < 3 {
        return Err(garde::Error::new(
            "Title must be at least 3 characters long",
        ));
    }
    Ok(())
}

fn description_rules(value: &str, _context: &()) -> garde::Result {
    if value.is_empty() {
        return Err(garde::Error::new("Description is required"));
    }
    if value.chars().count() < 10 {
        return Err(garde::Error::new(
            "Description must be at least 10 characters long",
        ));
    }
    Ok(())
}

/// The message of the first violated field, in field declaration order.
pub fn first_violation(report: &garde::Report) -> String {
    report
        .iter()
        .next()
        .map(|(_, error)| error.message().to_string())
        .unwrap_or_else(|| "Invalid request payload".to_string())
}
