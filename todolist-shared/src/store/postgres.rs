/// PostgreSQL store
///
/// Users keep their session tokens in a JSONB array column, so a user row
/// reads like a single document. Token pushes and pulls are one `UPDATE`
/// each; PostgreSQL's row lock makes them atomic against concurrent logins
/// and logouts for the same account.
///
/// # Example
///
/// ```no_run
/// use todolist_shared::db::pool::{create_pool, DatabaseConfig};
/// use todolist_shared::store::{postgres::PgStore, TodoStore};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let store = PgStore::new(pool);
/// let todos = store.list_todos(Uuid::new_v4()).await?;
/// assert!(todos.is_empty());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::{CredentialStore, Store, StoreError, TodoStore};
use crate::models::todo::{NewTodo, Todo, TodoChanges};
use crate::models::user::{AuthToken, NewUser, User};

const USER_COLUMNS: &str = "id, email, password_hash, tokens, created_at";
const TODO_COLUMNS: &str = "id, text, completed, completed_at, creator_id";

/// Row shape of the `users` table
#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    tokens: Json<Vec<AuthToken>>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            tokens: row.tokens.0,
            created_at: row.created_at,
        }
    }
}

/// Store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn map_insert_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            StoreError::DuplicateEmail
        }
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn create_user(&self, data: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(row.into())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_user_by_token(
        &self,
        id: Uuid,
        token: &AuthToken,
    ) -> Result<Option<User>, StoreError> {
        // JSONB containment matches token and purpose together
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND tokens @> $2"
        ))
        .bind(id)
        .bind(Json(vec![token]))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn push_token(&self, id: Uuid, token: &AuthToken) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE users SET tokens = tokens || $2 WHERE id = $1")
            .bind(id)
            .bind(Json(vec![token]))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn pull_token(&self, id: Uuid, token: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE users
            SET tokens = COALESCE(
                (
                    SELECT jsonb_agg(entry ORDER BY position)
                    FROM jsonb_array_elements(tokens) WITH ORDINALITY AS t(entry, position)
                    WHERE entry->>'token' <> $2
                ),
                '[]'::jsonb
            )
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn insert_todo(&self, data: NewTodo) -> Result<Todo, StoreError> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            r#"
            INSERT INTO todos (id, text, creator_id)
            VALUES ($1, $2, $3)
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(data.text)
        .bind(data.creator_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(todo)
    }

    async fn list_todos(&self, creator_id: Uuid) -> Result<Vec<Todo>, StoreError> {
        let todos = sqlx::query_as::<_, Todo>(&format!(
            r#"
            SELECT {TODO_COLUMNS}
            FROM todos
            WHERE creator_id = $1
            ORDER BY created_at, id
            "#
        ))
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(todos)
    }

    async fn find_todo(&self, id: Uuid, creator_id: Uuid) -> Result<Option<Todo>, StoreError> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE id = $1 AND creator_id = $2"
        ))
        .bind(id)
        .bind(creator_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(todo)
    }

    async fn update_todo(
        &self,
        id: Uuid,
        creator_id: Uuid,
        changes: TodoChanges,
    ) -> Result<Option<Todo>, StoreError> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            r#"
            UPDATE todos
            SET text = COALESCE($3, text),
                completed = $4,
                completed_at = $5
            WHERE id = $1 AND creator_id = $2
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(creator_id)
        .bind(changes.text)
        .bind(changes.completed)
        .bind(changes.completed_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(todo)
    }

    async fn delete_todo(&self, id: Uuid, creator_id: Uuid) -> Result<Option<Todo>, StoreError> {
        let todo = sqlx::query_as::<_, Todo>(&format!(
            "DELETE FROM todos WHERE id = $1 AND creator_id = $2 RETURNING {TODO_COLUMNS}"
        ))
        .bind(id)
        .bind(creator_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(todo)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let (one,): (i32,) = sqlx::query_as("SELECT 1").fetch_one(&self.pool).await?;
        if one != 1 {
            return Err(StoreError::Corrupt(format!("SELECT 1 returned {}", one)));
        }
        Ok(())
    }
}
