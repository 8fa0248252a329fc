/// In-memory store
///
/// Keeps users and todos in insertion-ordered vectors behind async locks.
/// Each trait method takes the lock once, so token pushes and pulls are
/// atomic with respect to each other just like the PostgreSQL backend.
///
/// # Example
///
/// ```
/// use todolist_shared::models::user::{AuthToken, NewUser};
/// use todolist_shared::store::{memory::MemoryStore, CredentialStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let user = store
///     .create_user(NewUser {
///         email: "a@x.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     })
///     .await?;
///
/// store.push_token(user.id, &AuthToken::auth("token")).await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CredentialStore, Store, StoreError, TodoStore};
use crate::models::todo::{NewTodo, Todo, TodoChanges};
use crate::models::user::{AuthToken, NewUser, User};

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    todos: RwLock<Vec<Todo>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored todos across all users
    pub async fn todo_count(&self) -> usize {
        self.todos.read().await.len()
    }

    /// Looks a user up by id, ignoring tokens
    pub async fn find_user(&self, id: Uuid) -> Option<User> {
        self.users.read().await.iter().find(|u| u.id == id).cloned()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create_user(&self, data: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.email == data.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let user = User {
            id: Uuid::new_v4(),
            email: data.email,
            password_hash: data.password_hash,
            tokens: Vec::new(),
            created_at: Utc::now(),
        };
        users.push(user.clone());

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_token(
        &self,
        id: Uuid,
        token: &AuthToken,
    ) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.id == id && u.has_token(&token.token, token.access))
            .cloned())
    }

    async fn push_token(&self, id: Uuid, token: &AuthToken) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;

        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.tokens.push(token.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn pull_token(&self, id: Uuid, token: &str) -> Result<(), StoreError> {
        let mut users = self.users.write().await;

        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.tokens.retain(|t| t.token != token);
        }

        Ok(())
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn insert_todo(&self, data: NewTodo) -> Result<Todo, StoreError> {
        let todo = Todo {
            id: Uuid::new_v4(),
            text: data.text,
            completed: false,
            completed_at: None,
            creator_id: data.creator_id,
        };
        self.todos.write().await.push(todo.clone());

        Ok(todo)
    }

    async fn list_todos(&self, creator_id: Uuid) -> Result<Vec<Todo>, StoreError> {
        let todos = self.todos.read().await;
        Ok(todos
            .iter()
            .filter(|t| t.creator_id == creator_id)
            .cloned()
            .collect())
    }

    async fn find_todo(&self, id: Uuid, creator_id: Uuid) -> Result<Option<Todo>, StoreError> {
        let todos = self.todos.read().await;
        Ok(todos
            .iter()
            .find(|t| t.id == id && t.creator_id == creator_id)
            .cloned())
    }

    async fn update_todo(
        &self,
        id: Uuid,
        creator_id: Uuid,
        changes: TodoChanges,
    ) -> Result<Option<Todo>, StoreError> {
        let mut todos = self.todos.write().await;

        Ok(todos
            .iter_mut()
            .find(|t| t.id == id && t.creator_id == creator_id)
            .map(|todo| {
                changes.apply(todo);
                todo.clone()
            }))
    }

    async fn delete_todo(&self, id: Uuid, creator_id: Uuid) -> Result<Option<Todo>, StoreError> {
        let mut todos = self.todos.write().await;

        let position = todos
            .iter()
            .position(|t| t.id == id && t.creator_id == creator_id);

        Ok(position.map(|index| todos.remove(index)))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
