/// User model
///
/// A user record holds the login email, the Argon2id password hash, and the
/// ordered list of session tokens currently accepted for the account.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY,
///     email TEXT NOT NULL UNIQUE,
///     password_hash TEXT NOT NULL,
///     tokens JSONB NOT NULL DEFAULT '[]'::jsonb,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Purpose tag carried by a session token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    /// Regular API session
    Auth,
}

impl TokenPurpose {
    /// Gets the purpose tag as string
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Auth => "auth",
        }
    }
}

/// One entry of a user's token list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    /// Purpose tag (always `auth` for API sessions)
    pub access: TokenPurpose,

    /// Signed token string as handed to the client
    pub token: String,
}

impl AuthToken {
    /// Wraps a freshly issued token string as an `auth` entry
    pub fn auth(token: impl Into<String>) -> Self {
        Self {
            access: TokenPurpose::Auth,
            token: token.into(),
        }
    }
}

/// User account
///
/// The password is only ever held as a PHC-format hash. `Debug` output
/// redacts both the hash and the token strings.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Trimmed email address, unique across users
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Live session tokens, oldest first
    pub tokens: Vec<AuthToken>,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Checks whether `token` is currently in the user's list for `purpose`
    pub fn has_token(&self, token: &str, purpose: TokenPurpose) -> bool {
        self.tokens
            .iter()
            .any(|t| t.token == token && t.access == purpose)
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("tokens", &self.tokens.len())
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Input for creating a new user
///
/// The hash must already be computed; stores never see plaintext passwords.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Trimmed email address
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(tokens: Vec<AuthToken>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            tokens,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_purpose_serializes_lowercase() {
        let json = serde_json::to_string(&AuthToken::auth("abc")).unwrap();
        assert_eq!(json, r#"{"access":"auth","token":"abc"}"#);
        assert_eq!(TokenPurpose::Auth.as_str(), "auth");
    }

    #[test]
    fn test_has_token() {
        let user = user_with(vec![AuthToken::auth("one"), AuthToken::auth("two")]);

        assert!(user.has_token("one", TokenPurpose::Auth));
        assert!(user.has_token("two", TokenPurpose::Auth));
        assert!(!user.has_token("three", TokenPurpose::Auth));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let user = user_with(vec![AuthToken::auth("very-secret-token")]);
        let rendered = format!("{:?}", user);

        assert!(rendered.contains("a@x.com"));
        assert!(!rendered.contains("$argon2id$secret"));
        assert!(!rendered.contains("very-secret-token"));
    }
}
