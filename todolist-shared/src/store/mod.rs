/// Persistence contracts
///
/// The service talks to storage only through the traits in this module:
///
/// - [`CredentialStore`]: user records and their session-token lists
/// - [`TodoStore`]: todo records, always addressed together with their owner
/// - [`Store`]: both of the above plus a liveness probe
///
/// # Implementations
///
/// - [`postgres::PgStore`]: PostgreSQL via sqlx (production)
/// - [`memory::MemoryStore`]: process-local maps (tests, local experiments)
///
/// # Atomicity
///
/// Token-list mutations are single atomic operations (`push_token`,
/// `pull_token`) rather than read-modify-write of the whole user, so
/// concurrent logins and logouts on the same account never drop each other's
/// tokens. Todo mutations filter on `(id, creator_id)` in the same statement
/// that writes.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::todo::{NewTodo, Todo, TodoChanges};
use crate::models::user::{AuthToken, NewUser, User};

pub mod memory;
pub mod postgres;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Email is already registered
    #[error("Email already exists")]
    DuplicateEmail,

    /// Stored data could not be decoded
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistent collection of users, password hashes, and live tokens
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Inserts a user with an empty token list
    ///
    /// Fails with [`StoreError::DuplicateEmail`] if the email is taken.
    async fn create_user(&self, data: NewUser) -> Result<User, StoreError>;

    /// Finds a user by exact email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Finds user `id` only if its token list holds `token` with the same purpose
    async fn find_user_by_token(
        &self,
        id: Uuid,
        token: &AuthToken,
    ) -> Result<Option<User>, StoreError>;

    /// Appends a token to the user's list in one atomic write
    ///
    /// Returns false if the user does not exist.
    async fn push_token(&self, id: Uuid, token: &AuthToken) -> Result<bool, StoreError>;

    /// Removes every entry equal to `token` from the user's list in one atomic write
    ///
    /// Removing an absent token is not an error.
    async fn pull_token(&self, id: Uuid, token: &str) -> Result<(), StoreError>;
}

/// Todo records scoped by owner
///
/// Every lookup or mutation takes the owner's id; a record owned by someone
/// else behaves exactly like a missing one.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Inserts an incomplete todo
    async fn insert_todo(&self, data: NewTodo) -> Result<Todo, StoreError>;

    /// Lists the owner's todos in insertion order
    async fn list_todos(&self, creator_id: Uuid) -> Result<Vec<Todo>, StoreError>;

    /// Fetches a todo by id and owner
    async fn find_todo(&self, id: Uuid, creator_id: Uuid) -> Result<Option<Todo>, StoreError>;

    /// Applies `changes` to a todo by id and owner, returning the new state
    async fn update_todo(
        &self,
        id: Uuid,
        creator_id: Uuid,
        changes: TodoChanges,
    ) -> Result<Option<Todo>, StoreError>;

    /// Deletes a todo by id and owner, returning the removed record
    async fn delete_todo(&self, id: Uuid, creator_id: Uuid) -> Result<Option<Todo>, StoreError>;
}

/// A complete backend: credentials, todos, and a health probe
#[async_trait]
pub trait Store: CredentialStore + TodoStore {
    /// Verifies the backend is reachable
    async fn ping(&self) -> Result<(), StoreError>;
}
