/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to, falling back to `PORT` (default: 3000)
/// - `JWT_SECRET`: Secret key for token signing (required, at least 32 characters)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, or `*` (default: *)
/// - `RUST_LOG`: Log filter (default: [`DEFAULT_LOG_FILTER`])
///
/// # Example
///
/// ```no_run
/// use todolist_api::config::Config;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}:{}", config.api.host, config.api.port);
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;

/// Tracing directives used when `RUST_LOG` is unset
///
/// Domain events are emitted under `todolist_shared::*`, HTTP spans under
/// `tower_http`.
pub const DEFAULT_LOG_FILTER: &str = "todolist_api=debug,todolist_shared=debug,tower_http=debug";

/// Minimum accepted length of the signing secret
pub const MIN_SECRET_LENGTH: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any origin
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for token signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let api_port = lookup("API_PORT")
            .or_else(|| lookup("PORT"))
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("Invalid API_PORT: {}", e))?;

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("Invalid DATABASE_MAX_CONNECTIONS: {}", e))?;

        let jwt_secret = lookup("JWT_SECRET")
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_SECRET_LENGTH {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_SECRET_LENGTH);
        }

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_bind_address() {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            jwt: JwtConfig {
                secret: SECRET.to_string(),
            },
        };

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://localhost/todolist"),
            ("JWT_SECRET", SECRET),
        ]))
        .unwrap();

        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.api.port, 3000);
        assert_eq!(config.api.cors_origins, vec!["*"]);
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn test_port_fallback_and_origins() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://localhost/todolist"),
            ("JWT_SECRET", SECRET),
            ("PORT", "5000"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,"),
        ]))
        .unwrap();
        assert_eq!(config.api.port, 5000);
        assert_eq!(config.api.cors_origins, vec!["http://a.test", "http://b.test"]);

        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://localhost/todolist"),
            ("JWT_SECRET", SECRET),
            ("PORT", "5000"),
            ("API_PORT", "6000"),
        ]))
        .unwrap();
        assert_eq!(config.api.port, 6000);
    }

    #[test]
    fn test_missing_or_weak_values_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("JWT_SECRET", SECRET)])).is_err());
        assert!(Config::from_lookup(lookup_from(&[(
            "DATABASE_URL",
            "postgresql://localhost/todolist"
        )]))
        .is_err());
        assert!(Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://localhost/todolist"),
            ("JWT_SECRET", "short"),
        ]))
        .is_err());
        assert!(Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgresql://localhost/todolist"),
            ("JWT_SECRET", SECRET),
            ("API_PORT", "not-a-port"),
        ]))
        .is_err());
    }

    #[test]
    fn test_default_log_filter_covers_domain_events() {
        use tracing::Level;
        use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

        let subscriber = tracing_subscriber::registry().with(EnvFilter::new(DEFAULT_LOG_FILTER));

        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(target: "todolist_shared::session", Level::INFO));
            assert!(tracing::enabled!(target: "todolist_shared::auth::authenticator", Level::DEBUG));
            assert!(tracing::enabled!(target: "todolist_api::app", Level::INFO));
            assert!(tracing::enabled!(target: "tower_http::trace", Level::DEBUG));
            assert!(!tracing::enabled!(target: "sqlx::query", Level::INFO));
        });
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", JwtConfig { secret: SECRET.to_string() });
        assert!(!rendered.contains(SECRET));
    }
}
