/// Todo model
///
/// Todos belong to exactly one user (`creator_id`), set at creation and never
/// reassigned. Completion is tracked by the `completed` flag together with
/// `completed_at`, which is set if and only if the todo is complete.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE todos (
///     id UUID PRIMARY KEY,
///     text TEXT NOT NULL CHECK (length(text) > 0),
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     completed_at BIGINT,
///     creator_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # JSON
///
/// ```json
/// {
///   "_id": "uuid",
///   "text": "Buy milk",
///   "completed": false,
///   "completedAt": null,
///   "_creator": "uuid"
/// }
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Todo item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    /// Unique todo ID (UUID v4)
    #[serde(rename = "_id")]
    pub id: Uuid,

    /// Trimmed, non-empty text
    pub text: String,

    /// Whether the todo is done
    pub completed: bool,

    /// Completion time in epoch milliseconds, `None` while incomplete
    #[serde(rename = "completedAt")]
    pub completed_at: Option<i64>,

    /// Owning user
    #[serde(rename = "_creator")]
    pub creator_id: Uuid,
}

/// Create request as submitted by a client
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateTodo {
    /// Todo text; trimmed before validation
    #[validate(
        required(message = "Text is required"),
        length(min = 1, message = "Text must not be empty")
    )]
    pub text: Option<String>,
}

impl CreateTodo {
    /// Returns a copy with surrounding whitespace removed from `text`
    pub fn trimmed(self) -> Self {
        Self {
            text: self.text.map(|t| t.trim().to_string()),
        }
    }
}

/// Partial update as submitted by a client
///
/// Only `text` and `completed` are recognised; any other submitted field is
/// dropped during deserialization.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTodo {
    /// New text; trimmed before validation
    #[validate(length(min = 1, message = "Text must not be empty"))]
    pub text: Option<String>,

    /// Completion flag; anything but `Some(true)` marks the todo incomplete
    pub completed: Option<bool>,
}

impl UpdateTodo {
    /// Returns a copy with surrounding whitespace removed from `text`
    pub fn trimmed(self) -> Self {
        Self {
            text: self.text.map(|t| t.trim().to_string()),
            completed: self.completed,
        }
    }
}

/// Input for inserting a todo
#[derive(Debug, Clone)]
pub struct NewTodo {
    /// Validated, trimmed text
    pub text: String,

    /// Owning user
    pub creator_id: Uuid,
}

/// Fields written by an update
///
/// Built from an [`UpdateTodo`] so that `completed` and `completed_at`
/// always move together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoChanges {
    /// Replacement text, `None` keeps the stored text
    pub text: Option<String>,

    /// New completion flag
    pub completed: bool,

    /// New completion time
    pub completed_at: Option<i64>,
}

impl TodoChanges {
    /// Derives the stored completion state from a client update
    ///
    /// `completed == Some(true)` stamps `now_millis`; `Some(false)` or an
    /// omitted flag clears completion.
    pub fn from_update(update: UpdateTodo, now_millis: i64) -> Self {
        match update.completed {
            Some(true) => Self {
                text: update.text,
                completed: true,
                completed_at: Some(now_millis),
            },
            _ => Self {
                text: update.text,
                completed: false,
                completed_at: None,
            },
        }
    }

    /// Applies the changes to an in-memory record
    pub fn apply(&self, todo: &mut Todo) {
        if let Some(ref text) = self.text {
            todo.text = text.clone();
        }
        todo.completed = self.completed;
        todo.completed_at = self.completed_at;
    }
}
