//! Todo domain model.
//!
//! # Responsibility
//! - Define the single persisted record of the todo service.
//! - Provide validation used by repository write and read paths.
//!
//! # Invariants
//! - `id` is non-blank and never reused for another todo while stored.
//! - `title` is non-blank.
//! - `completed` starts as `false`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Identifier of a todo record.
///
/// Kept as a plain string because ids may be supplied by callers.
pub type TodoId = String;

/// Validation failures for todo records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoValidationError {
    BlankId,
    BlankTitle,
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId => write!(f, "todo id must not be blank"),
            Self::BlankTitle => write!(f, "todo title must not be blank"),
        }
    }
}

impl Error for TodoValidationError {}

/// Persisted todo record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier, primary key in storage.
    pub id: TodoId,
    /// Short label.
    pub title: String,
    /// Free text, empty when not provided.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl Todo {
    /// Creates an incomplete todo with a caller-provided id.
    ///
    /// Does not validate; repository writes call [`Todo::validate`].
    pub fn with_id(
        id: impl Into<TodoId>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            completed: false,
        }
    }

    /// Checks record invariants before persistence.
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        if self.id.trim().is_empty() {
            return Err(TodoValidationError::BlankId);
        }
        if self.title.trim().is_empty() {
            return Err(TodoValidationError::BlankTitle);
        }
        Ok(())
    }
}

/// Generates a fresh todo id (hyphenated UUID v4).
pub fn generate_id() -> TodoId {
    Uuid::new_v4().to_string()
}
