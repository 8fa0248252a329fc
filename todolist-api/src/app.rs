/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use todolist_api::{app::AppState, config::Config};
/// use todolist_shared::db::pool::{create_pool, DatabaseConfig};
/// use todolist_shared::store::postgres::PgStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = create_pool(DatabaseConfig {
///     url: config.database.url.clone(),
///     ..Default::default()
/// })
/// .await?;
/// let state = AppState::new(Arc::new(PgStore::new(pool)), config);
/// let app = todolist_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use todolist_shared::{
    auth::{authenticator::Authenticator, token::TokenCodec},
    session::SessionService,
    store::{CredentialStore, Store, TodoStore},
    todos::TodoService,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Header carrying the session token, on requests and on signup/login responses
pub const AUTH_HEADER: &str = "x-auth";

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Signup, login, logout
    pub sessions: SessionService,

    /// Token-to-user resolution
    pub auth: Authenticator,

    /// Ownership-scoped todo operations
    pub todos: TodoService,

    /// Backend used for health probes
    pub store: Arc<dyn Store>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires services over a single store backend
    pub fn new<S: Store + 'static>(store: Arc<S>, config: Config) -> Self {
        let codec = TokenCodec::new(&config.jwt.secret);
        let credentials: Arc<dyn CredentialStore> = store.clone();
        let todo_store: Arc<dyn TodoStore> = store.clone();

        Self {
            sessions: SessionService::new(codec.clone(), credentials.clone()),
            auth: Authenticator::new(codec, credentials),
            todos: TodoService::new(todo_store),
            store,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET    /health            # Health check (public)
/// ├── POST   /users             # Signup (public)
/// ├── POST   /users/login       # Login (public)
/// ├── GET    /users/me          # Current user (authenticated)
/// ├── DELETE /users/me/token    # Logout (authenticated)
/// └── /todos                    # Todo CRUD (authenticated)
///     ├── POST   /
///     ├── GET    /
///     ├── GET    /:id
///     ├── PATCH  /:id
///     └── DELETE /:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer), exposing the `x-auth` header
/// 3. Authentication (`x-auth` header, protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/users", post(routes::users::signup))
        .route("/users/login", post(routes::users::login));

    let protected_routes = Router::new()
        .route("/users/me", get(routes::users::me))
        .route("/users/me/token", delete(routes::users::logout))
        .route(
            "/todos",
            post(routes::todos::create_todo).get(routes::todos::list_todos),
        )
        .route(
            "/todos/:id",
            get(routes::todos::get_todo)
                .patch(routes::todos::update_todo)
                .delete(routes::todos::delete_todo),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let auth_header = HeaderName::from_static(AUTH_HEADER);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, auth_header.clone()])
            .expose_headers([auth_header])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Authentication middleware layer
///
/// Resolves the `x-auth` header to a live user and injects the
/// [`AuthContext`](todolist_shared::auth::authenticator::AuthContext) into
/// request extensions. Any failure is a bodiless 401.
async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(AUTH_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let context = state.auth.authenticate(token).await?;

    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}
