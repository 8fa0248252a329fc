/// Session lifecycle: signup, login, logout
///
/// Every successful signup or login appends a freshly issued token to the
/// user's list; logout removes exactly the token the request was made with.
/// Sessions are additive, so a user may be logged in from several clients at
/// once and logging out of one leaves the others untouched.
///
/// Argon2 hashing and verification run on tokio's blocking pool so request
/// tasks are never stalled by password work.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use todolist_shared::auth::token::TokenCodec;
/// use todolist_shared::session::{Credentials, SessionService};
/// use todolist_shared::store::memory::MemoryStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let sessions = SessionService::new(
///     TokenCodec::new("secret-key-at-least-32-bytes-long!"),
///     Arc::new(MemoryStore::new()),
/// );
///
/// let signup = sessions
///     .signup(Credentials::new("a@x.com", "password1"))
///     .await?;
/// let login = sessions
///     .login(Credentials::new("a@x.com", "password1"))
///     .await?;
/// assert_ne!(signup.token, login.token);
///
/// sessions.logout(login.user.id, &login.token).await?;
/// # Ok(())
/// # }
/// ```

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::auth::password::{self, PasswordError};
use crate::auth::token::{TokenCodec, TokenError};
use crate::models::user::{AuthToken, NewUser, User};
use crate::store::{CredentialStore, StoreError};

/// Error type for session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Email or password has the wrong shape
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Another account already uses the email
    #[error("Email already in use")]
    EmailTaken,

    /// Unknown email or wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Token could not be issued
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Hashing or verification failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Credential store failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Background task failure or inconsistent state
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Email and password as submitted for signup or login
#[derive(Clone, Deserialize, Validate)]
pub struct Credentials {
    /// Email address; surrounding whitespace is ignored
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

impl Credentials {
    /// Builds credentials from parts
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    fn trimmed(self) -> Self {
        Self {
            email: self.email.trim().to_string(),
            password: self.password,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An authenticated session: the user and the token just issued for them
#[derive(Debug, Clone)]
pub struct Session {
    /// User the token belongs to, including the new token in its list
    pub user: User,

    /// Newly issued token
    pub token: String,
}

/// Signup, login, and logout over a credential store
#[derive(Clone)]
pub struct SessionService {
    codec: TokenCodec,
    store: Arc<dyn CredentialStore>,
}

impl SessionService {
    /// Creates the service over a codec and credential store
    pub fn new(codec: TokenCodec, store: Arc<dyn CredentialStore>) -> Self {
        Self { codec, store }
    }

    /// Registers a user and opens their first session
    ///
    /// # Errors
    ///
    /// - `Validation` if the email is malformed or the password too short
    /// - `EmailTaken` if the trimmed email is already registered
    pub async fn signup(&self, credentials: Credentials) -> Result<Session, SessionError> {
        let credentials = credentials.trimmed();
        credentials.validate()?;

        let password_hash = hash_blocking(credentials.password).await?;

        let mut user = self
            .store
            .create_user(NewUser {
                email: credentials.email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::DuplicateEmail => SessionError::EmailTaken,
                other => SessionError::Store(other),
            })?;

        let token = self.open_session(&mut user).await?;

        info!(user_id = %user.id, "User signed up");
        Ok(Session { user, token })
    }

    /// Checks credentials and opens an additional session
    ///
    /// Existing sessions stay valid.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` for an unknown email or a wrong password; the two
    /// cases are indistinguishable, including in timing.
    pub async fn login(&self, credentials: Credentials) -> Result<Session, SessionError> {
        let credentials = credentials.trimmed();

        let Some(mut user) = self.store.find_user_by_email(&credentials.email).await? else {
            verify_dummy_blocking(credentials.password).await?;
            debug!("Login for unknown email");
            return Err(SessionError::InvalidCredentials);
        };

        let valid = verify_blocking(credentials.password, user.password_hash.clone()).await?;
        if !valid {
            debug!(user_id = %user.id, "Login with wrong password");
            return Err(SessionError::InvalidCredentials);
        }

        let token = self.open_session(&mut user).await?;

        info!(user_id = %user.id, sessions = user.tokens.len(), "User logged in");
        Ok(Session { user, token })
    }

    /// Removes `token` from the user's list
    ///
    /// Idempotent: removing a token that is already gone succeeds.
    pub async fn logout(&self, user_id: Uuid, token: &str) -> Result<(), SessionError> {
        self.store.pull_token(user_id, token).await?;

        info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    async fn open_session(&self, user: &mut User) -> Result<String, SessionError> {
        let token = self.codec.issue(user.id)?;
        let entry = AuthToken::auth(token.clone());

        if !self.store.push_token(user.id, &entry).await? {
            return Err(SessionError::Internal(format!(
                "User {} vanished while opening a session",
                user.id
            )));
        }

        user.tokens.push(entry);
        Ok(token)
    }
}

async fn hash_blocking(password: String) -> Result<String, SessionError> {
    let hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| SessionError::Internal(format!("Hashing task failed: {}", e)))??;

    Ok(hash)
}

async fn verify_blocking(password: String, hash: String) -> Result<bool, SessionError> {
    let valid = tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| SessionError::Internal(format!("Verification task failed: {}", e)))??;

    Ok(valid)
}

async fn verify_dummy_blocking(password: String) -> Result<(), SessionError> {
    tokio::task::spawn_blocking(move || password::verify_dummy(&password))
        .await
        .map_err(|e| SessionError::Internal(format!("Verification task failed: {}", e)))?;

    Ok(())
}
