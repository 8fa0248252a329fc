/// Request authentication
///
/// Resolves a client-supplied token to a live user:
///
/// 1. The [`TokenCodec`] checks the signature and yields the user id and purpose
/// 2. The [`CredentialStore`] must hold that exact token in the user's list
///
/// A token that verifies but was revoked (logout) fails step 2. The resolved
/// [`AuthContext`] keeps the token string so logout can remove exactly the
/// session that made the request.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use todolist_shared::auth::{authenticator::Authenticator, token::TokenCodec};
/// use todolist_shared::store::memory::MemoryStore;
///
/// # async fn example(token: &str) -> Result<(), Box<dyn std::error::Error>> {
/// let store = Arc::new(MemoryStore::new());
/// let auth = Authenticator::new(TokenCodec::new("secret"), store);
///
/// let context = auth.authenticate(token).await?;
/// println!("Request from {}", context.user.email);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use tracing::debug;

use super::token::TokenCodec;
use crate::models::user::{AuthToken, User};
use crate::store::{CredentialStore, StoreError};

/// Error type for authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Token is missing, forged, of the wrong purpose, or no longer live
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The credential store could not be queried
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Identity of an authenticated request
///
/// Inserted into request extensions by the HTTP layer.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Resolved user
    pub user: User,

    /// Token the request was made with
    pub token: String,
}

/// Resolves tokens to users
#[derive(Clone)]
pub struct Authenticator {
    codec: TokenCodec,
    store: Arc<dyn CredentialStore>,
}

impl Authenticator {
    /// Creates an authenticator over a codec and credential store
    pub fn new(codec: TokenCodec, store: Arc<dyn CredentialStore>) -> Self {
        Self { codec, store }
    }

    /// Resolves `token` to its user, or fails with [`AuthError::Unauthorized`]
    ///
    /// Read-only: nothing is written on success or failure.
    pub async fn authenticate(&self, token: &str) -> Result<AuthContext, AuthError> {
        let verified = self.codec.verify(token).map_err(|e| {
            debug!(error = %e, "Rejected token");
            AuthError::Unauthorized("Invalid token".to_string())
        })?;

        // The list entry must carry the same purpose the signature vouches for
        let entry = AuthToken {
            access: verified.purpose,
            token: token.to_string(),
        };

        let user = self
            .store
            .find_user_by_token(verified.user_id, &entry)
            .await?
            .ok_or_else(|| {
                debug!(user_id = %verified.user_id, "Token not in user's list");
                AuthError::Unauthorized("Token revoked".to_string())
            })?;

        Ok(AuthContext {
            user,
            token: entry.token,
        })
    }
}
