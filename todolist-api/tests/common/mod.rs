//! Common test utilities for API tests
//!
//! This module provides shared infrastructure for HTTP-level tests:
//! - An in-memory store behind the real router
//! - Request builders for JSON bodies and the `x-auth` header
//! - Signup/login helpers that return the issued token

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use todolist_api::app::{build_router, AppState, AUTH_HEADER};
use todolist_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use todolist_shared::store::memory::MemoryStore;
use tower::Service as _;

pub const PASSWORD: &str = "password1";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a new test context with an empty store
    pub fn new() -> Self {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: "postgresql://unused".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            },
        };

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config.clone());
        let app = build_router(state);

        TestContext { store, app, config }
    }

    /// Sends a request through the router
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().call(request).await.unwrap()
    }

    /// Sends a request and decodes the JSON body
    pub async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.send(request).await;
        let status = response.status();
        (status, body_json(response).await)
    }

    /// Signs up and returns the issued token
    pub async fn signup(&self, email: &str) -> String {
        let response = self
            .send(post_json("/users", None, json!({ "email": email, "password": PASSWORD })))
            .await;
        assert_eq!(response.status(), StatusCode::OK, "signup failed for {}", email);
        token_of(&response)
    }

    /// Logs in and returns the issued token
    pub async fn login(&self, email: &str) -> String {
        let response = self
            .send(post_json(
                "/users/login",
                None,
                json!({ "email": email, "password": PASSWORD }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK, "login failed for {}", email);
        token_of(&response)
    }

    /// Creates a todo and returns its JSON
    pub async fn create_todo(&self, token: &str, text: &str) -> Value {
        let (status, body) = self
            .send_json(post_json("/todos", Some(token), json!({ "text": text })))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["todo"].clone()
    }
}

/// Builds a request with an optional `x-auth` header and JSON body
pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(AUTH_HEADER, token);
    }

    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    request("GET", uri, token, None)
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    request("DELETE", uri, token, None)
}

pub fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    request("POST", uri, token, Some(body))
}

pub fn patch_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    request("PATCH", uri, token, Some(body))
}

/// Reads the `x-auth` response header
pub fn token_of(response: &Response<Body>) -> String {
    response
        .headers()
        .get(AUTH_HEADER)
        .expect("x-auth header should be present")
        .to_str()
        .unwrap()
        .to_string()
}

/// Reads the body as raw bytes
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Reads the body as JSON, `Value::Null` when empty
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = body_bytes(response).await;
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}
