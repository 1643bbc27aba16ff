//! Shared test utilities for integration tests.
//!
//! `TestClient` drives the application with in-process requests against a
//! fresh in-memory database. Methods are broad on purpose so every test file
//! can use the subset it needs.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use pocketledger::config::{AuthMode, Config};
use pocketledger::db::{create_in_memory_pool, migrations};
use pocketledger::handlers;
use pocketledger::server;
use pocketledger::state::AppState;
use serde_json::Value;
use std::path::PathBuf;
use tower::ServiceExt;

/// A test client with its own database and session store.
pub struct TestClient {
    state: AppState,
}

impl TestClient {
    /// Create a new test client with a fresh in-memory database (unauthenticated mode).
    pub fn new() -> Self {
        Self::with_auth_mode(AuthMode::Unauthenticated)
    }

    /// Create a new test client with a specific authentication mode.
    pub fn with_auth_mode(auth_mode: AuthMode) -> Self {
        let pool = create_in_memory_pool().expect("Failed to create in-memory pool");
        {
            let conn = pool.get().expect("Failed to get connection");
            migrations::run_migrations(&conn).expect("Failed to run migrations");
        }

        let config = Config {
            host: "127.0.0.1".into(),
            port: 7070,
            database_path: PathBuf::from(":memory:"),
            currency: "THB".into(),
            auth_mode,
        };

        Self {
            state: AppState::new(pool, config),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Router without auth middleware for direct handler testing.
    pub fn router(&self) -> Router {
        handlers::routes().with_state(self.state.clone())
    }

    /// The full production router, auth middleware included.
    pub fn router_with_auth(&self) -> Router {
        server::router(self.state.clone())
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, String) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8_lossy(&body).to_string())
    }

    fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// Make a GET request and return status and body.
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        Self::send(self.router(), request).await
    }

    /// Make a GET request through the auth middleware.
    pub async fn get_with_auth(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        Self::send(self.router_with_auth(), request).await
    }

    /// GET through the auth middleware carrying a session cookie.
    pub async fn get_with_session(&self, uri: &str, session: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .uri(uri)
            .header(header::COOKIE, format!("session={session}"))
            .body(Body::empty())
            .unwrap();
        Self::send(self.router_with_auth(), request).await
    }

    /// Get JSON from an endpoint and parse it.
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        uri: &str,
    ) -> (StatusCode, Option<T>) {
        let (status, body) = self.get(uri).await;
        let parsed = serde_json::from_str(&body).ok();
        (status, parsed)
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, String) {
        Self::send(self.router(), Self::json_request("POST", uri, body)).await
    }

    pub async fn put_json(&self, uri: &str, body: &Value) -> (StatusCode, String) {
        Self::send(self.router(), Self::json_request("PUT", uri, body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        Self::send(self.router(), request).await
    }

    /// POST the login form. Returns the status and the session token set by
    /// the response, if any.
    pub async fn login(&self, password: &str) -> (StatusCode, Option<String>) {
        let body = format!("password={}", urlencoding::encode(password));
        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();

        let response = self.router_with_auth().oneshot(request).await.unwrap();
        let status = response.status();
        let session = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|v| v.strip_prefix("session="))
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        (status, session)
    }

    /// POST /logout carrying a session cookie.
    pub async fn logout(&self, session: &str) -> StatusCode {
        let request = Request::builder()
            .method("POST")
            .uri("/logout")
            .header(header::COOKIE, format!("session={session}"))
            .body(Body::empty())
            .unwrap();
        Self::send(self.router_with_auth(), request).await.0
    }

    // =========================================================================
    // Helper methods for creating entities through the API
    // =========================================================================

    /// Create a transaction through the API and return the stored record.
    pub async fn create_transaction(
        &self,
        title: &str,
        amount: &str,
        kind: &str,
        category: &str,
        date: &str,
    ) -> Value {
        let (status, body) = self
            .post_json(
                "/api/transactions",
                &serde_json::json!({
                    "title": title,
                    "amount": amount,
                    "type": kind,
                    "category": category,
                    "date": date,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
        serde_json::from_str(&body).unwrap()
    }
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}
