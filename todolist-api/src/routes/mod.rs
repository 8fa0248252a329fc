/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: Signup, login, current user, logout
/// - `todos`: Todo CRUD scoped to the caller

pub mod health;
pub mod todos;
pub mod users;
