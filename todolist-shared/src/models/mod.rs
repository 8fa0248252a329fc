/// Data models for the todolist service
///
/// # Models
///
/// - `user`: User accounts, password hashes, and live session tokens
/// - `todo`: Todo items owned by a single user
///
/// Models are plain data; persistence lives behind the contracts in
/// [`crate::store`].

pub mod todo;
pub mod user;
