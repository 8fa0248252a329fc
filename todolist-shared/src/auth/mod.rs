/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`token`]: Signed session tokens (HS256 JWT)
/// - [`authenticator`]: Token-to-user resolution against the credential store
///
/// # Example
///
/// ```
/// use todolist_shared::auth::password::{hash_password, verify_password};
/// use todolist_shared::auth::token::TokenCodec;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let codec = TokenCodec::new("secret-key-at-least-32-bytes-long!");
/// let token = codec.issue(Uuid::new_v4())?;
/// assert!(codec.verify(&token).is_ok());
/// # Ok(())
/// # }
/// ```

pub mod authenticator;
pub mod password;
pub mod token;
