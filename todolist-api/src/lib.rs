//! # Todolist API Server Library
//!
//! HTTP surface of the todolist service: per-user todo lists behind
//! token authentication.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder, auth middleware
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
