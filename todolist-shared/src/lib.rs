//! # Todolist Shared Library
//!
//! Domain logic for the todolist service, independent of the HTTP layer.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, session tokens, request authentication
//! - `db`: PostgreSQL pool and migrations
//! - `models`: Users, tokens, and todos
//! - `session`: Signup, login, and logout
//! - `store`: Persistence traits with PostgreSQL and in-memory backends
//! - `todos`: Ownership-scoped todo operations

pub mod auth;
pub mod db;
pub mod models;
pub mod session;
pub mod store;
pub mod todos;

/// Current version of the todolist shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
