/// Session token codec
///
/// Tokens are HS256 JWTs that bind a user id to a purpose tag. The codec only
/// proves "we issued this token for this user"; whether the token is still
/// live is decided by the user's token list (see [`super::authenticator`]).
///
/// # Claims
///
/// - `sub`: User ID
/// - `access`: Purpose tag (`auth`)
/// - `iss`: Issuer, always `todolist`
/// - `iat`: Issued at (Unix timestamp)
/// - `jti`: Random token ID, so two tokens issued in the same second differ
///
/// There is no `exp` claim. A token stays valid until it is removed from the
/// user's list.
///
/// # Example
///
/// ```
/// use todolist_shared::auth::token::TokenCodec;
/// use todolist_shared::models::user::TokenPurpose;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = TokenCodec::new("test-secret-key-at-least-32-bytes-long");
/// let user_id = Uuid::new_v4();
///
/// let token = codec.issue(user_id)?;
/// let verified = codec.verify(&token)?;
/// assert_eq!(verified.user_id, user_id);
/// assert_eq!(verified.purpose, TokenPurpose::Auth);
/// # Ok(())
/// # }
/// ```

use std::fmt;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::TokenPurpose;

/// Issuer written into and required from every token
pub const ISSUER: &str = "todolist";

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature, issuer, or payload check failed
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// JWT claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Purpose tag
    pub access: TokenPurpose,

    /// Issuer - Always "todolist"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Unique token ID
    pub jti: Uuid,
}

impl Claims {
    /// Creates `auth` claims for a user
    pub fn auth(user_id: Uuid) -> Self {
        Self {
            sub: user_id,
            access: TokenPurpose::Auth,
            iss: ISSUER.to_string(),
            iat: Utc::now().timestamp(),
            jti: Uuid::new_v4(),
        }
    }
}

/// Result of a successful verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedToken {
    /// User the token was issued for
    pub user_id: Uuid,

    /// Purpose the token was issued for
    pub purpose: TokenPurpose,
}

/// Signs and verifies session tokens with a process-wide secret
///
/// Constructed once from configuration and shared by value; cloning copies
/// the derived keys.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Creates a codec for the given secret
    ///
    /// The secret should be at least 32 bytes; configuration enforces this.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["iss", "sub"]);
        validation.validate_exp = false;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issues a new `auth` token for a user
    pub fn issue(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.encode(&Claims::auth(user_id))
    }

    /// Signs arbitrary claims
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Checks signature and issuer, then extracts user id and purpose
    pub fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenError::InvalidToken(e.to_string()))?;

        Ok(VerifiedToken {
            user_id: data.claims.sub,
            purpose: data.claims.access,
        })
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}
