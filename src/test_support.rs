// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for handler and middleware tests.

use chrono::Utc;
use tempfile::TempDir;

use crate::auth::{password::hash_password, token::DEFAULT_TOKEN_TTL, Role, TokenService};
use crate::state::AppState;
use crate::storage::{DocumentStore, StoragePaths, StoredUser, UserRepository};

pub const TEST_SECRET: &[u8] = b"test-secret";
pub const TEST_PASSWORD: &str = "password123";
pub const TEST_BCRYPT_COST: u32 = 4;

/// App state over an initialized store in a fresh temp dir.
pub fn test_state() -> (AppState, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut store = DocumentStore::new(StoragePaths::new(temp_dir.path()));
    store.initialize().expect("Failed to initialize");

    let state = AppState::new(store, TokenService::new(TEST_SECRET, DEFAULT_TOKEN_TTL))
        .with_bcrypt_cost(TEST_BCRYPT_COST);
    (state, temp_dir)
}

/// Persist a user with password `password123` and email `<username>@example.com`.
pub async fn seed_user(state: &AppState, username: &str, role: Role) -> StoredUser {
    let now = Utc::now();
    let user = StoredUser {
        id: uuid::Uuid::new_v4().to_string(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: hash_password(TEST_PASSWORD.to_string(), TEST_BCRYPT_COST)
            .await
            .expect("hash succeeds"),
        role,
        created_at: now,
        updated_at: now,
    };
    UserRepository::new(state.storage())
        .create(&user)
        .expect("seed user");
    user
}

/// Send one request through the router and decode the JSON response body.
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (axum::http::StatusCode, serde_json::Value) {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request builds");

    let response = app.clone().oneshot(request).await.expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response is JSON")
    };
    (status, json)
}
