/// Ownership-scoped todo operations
///
/// Every method takes the caller's user id. Lookups filter on both the todo id
/// and the caller, so a todo that belongs to someone else, a todo that does not
/// exist, and an id that is not a UUID all produce [`TodoError::NotFound`].

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::models::todo::{CreateTodo, NewTodo, Todo, TodoChanges, UpdateTodo};
use crate::store::{StoreError, TodoStore};

/// Error type for todo operations
#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    /// Missing, foreign, or malformed id
    #[error("Todo not found")]
    NotFound,

    /// Request body failed validation
    #[error("Validation failed: {0}")]
    Invalid(#[from] ValidationErrors),

    /// Todo store failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Parses a client-supplied todo id
///
/// Returns `None` for anything that is not a UUID.
pub fn parse_todo_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

/// Todo CRUD for a single caller at a time
#[derive(Clone)]
pub struct TodoService {
    store: Arc<dyn TodoStore>,
}

impl TodoService {
    /// Creates the service over a todo store
    pub fn new(store: Arc<dyn TodoStore>) -> Self {
        Self { store }
    }

    /// Creates an incomplete todo owned by `caller`
    pub async fn create(&self, caller: Uuid, request: CreateTodo) -> Result<Todo, TodoError> {
        let request = request.trimmed();
        request.validate()?;

        let text = request.text.unwrap_or_default();
        let todo = self
            .store
            .insert_todo(NewTodo {
                text,
                creator_id: caller,
            })
            .await?;

        info!(todo_id = %todo.id, user_id = %caller, "Todo created");
        Ok(todo)
    }

    /// Lists the caller's todos in insertion order
    pub async fn list(&self, caller: Uuid) -> Result<Vec<Todo>, TodoError> {
        Ok(self.store.list_todos(caller).await?)
    }

    /// Fetches one of the caller's todos
    pub async fn get(&self, caller: Uuid, raw_id: &str) -> Result<Todo, TodoError> {
        let id = parse_todo_id(raw_id).ok_or(TodoError::NotFound)?;

        self.store
            .find_todo(id, caller)
            .await?
            .ok_or(TodoError::NotFound)
    }

    /// Applies a partial update to one of the caller's todos
    ///
    /// `completed: true` stamps the current time; `false` or an omitted flag
    /// marks the todo incomplete. Supplied text must be non-empty after
    /// trimming.
    pub async fn update(
        &self,
        caller: Uuid,
        raw_id: &str,
        request: UpdateTodo,
    ) -> Result<Todo, TodoError> {
        let id = parse_todo_id(raw_id).ok_or(TodoError::NotFound)?;

        let request = request.trimmed();
        request.validate()?;

        let changes = TodoChanges::from_update(request, Utc::now().timestamp_millis());
        let todo = self
            .store
            .update_todo(id, caller, changes)
            .await?
            .ok_or(TodoError::NotFound)?;

        info!(todo_id = %todo.id, completed = todo.completed, "Todo updated");
        Ok(todo)
    }

    /// Deletes one of the caller's todos, returning its final state
    pub async fn delete(&self, caller: Uuid, raw_id: &str) -> Result<Todo, TodoError> {
        let id = parse_todo_id(raw_id).ok_or(TodoError::NotFound)?;

        let todo = self
            .store
            .delete_todo(id, caller)
            .await?
            .ok_or(TodoError::NotFound)?;

        info!(todo_id = %todo.id, user_id = %caller, "Todo deleted");
        Ok(todo)
    }
}
