/// User and session endpoints
///
/// # Endpoints
///
/// - `POST /users` - Sign up; returns the user and an `x-auth` header
/// - `POST /users/login` - Log in; returns the user and a new `x-auth` header
/// - `GET /users/me` - Current user (authenticated)
/// - `DELETE /users/me/token` - Log out the calling session (authenticated)
///
/// The user body never includes the password hash or the token list.

use crate::{
    app::{AppState, AUTH_HEADER},
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use todolist_shared::{
    auth::authenticator::AuthContext,
    models::user::User,
    session::{Credentials, Session},
};
use uuid::Uuid;

/// Public view of a user
#[derive(Debug, Serialize, Deserialize)]
pub struct UserBody {
    /// User ID
    #[serde(rename = "_id")]
    pub id: Uuid,

    /// Email address
    pub email: String,
}

impl From<&User> for UserBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

/// Signup handler
///
/// # Request
///
/// ```json
/// { "email": "user@example.com", "password": "password1" }
/// ```
///
/// # Errors
///
/// - 400 for a malformed body, bad email, short password, or taken email
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(credentials) = payload?;

    let session = state.sessions.signup(credentials).await?;

    session_response(&session)
}

/// Login handler
///
/// Each login opens an additional session; earlier tokens stay valid.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(credentials) = payload?;

    let session = state.sessions.login(credentials).await?;

    session_response(&session)
}

/// Current user handler
pub async fn me(Extension(context): Extension<AuthContext>) -> Json<UserBody> {
    Json(UserBody::from(&context.user))
}

/// Logout handler
///
/// Revokes only the token the request was made with. Responds 200 with an
/// empty body.
pub async fn logout(
    State(state): State<AppState>,
    Extension(context): Extension<AuthContext>,
) -> ApiResult<StatusCode> {
    state
        .sessions
        .logout(context.user.id, &context.token)
        .await?;

    Ok(StatusCode::OK)
}

fn session_response(session: &Session) -> ApiResult<Response> {
    let token = HeaderValue::from_str(&session.token)
        .map_err(|e| ApiError::InternalError(format!("Token is not a valid header: {}", e)))?;

    Ok((
        [(HeaderName::from_static(AUTH_HEADER), token)],
        Json(UserBody::from(&session.user)),
    )
        .into_response())
}
