// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Client
//!
//! Rust client for the knowledge base API. The client keeps the session
//! returned by register/login in a [`SessionStore`], reloads it at
//! startup, and attaches `Authorization: Bearer <token>` to every request
//! while a session exists.

pub mod session;

use std::{path::Path, time::Duration};

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    AuthResponse, CreatePostRequest, DeletePostResponse, LoginRequest, MeResponse, Post,
    PublicUser, RegisterRequest, UpdatePostRequest,
};
use crate::validation::FieldError;

pub use session::{Session, SessionStore};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("session storage failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session data is invalid: {0}")]
    SessionFormat(#[from] serde_json::Error),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Api {
        status: u16,
        message: String,
        errors: Vec<FieldError>,
    },
}

impl ClientError {
    /// HTTP status for errors returned by the server.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    #[serde(default)]
    errors: Vec<FieldError>,
}

/// Query for [`ApiClient::list_posts`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

pub struct ApiClient {
    /// API root, e.g. `http://localhost:5000/api`
    base_url: String,
    http: Client,
    sessions: SessionStore,
    session: Option<Session>,
}

impl ApiClient {
    /// Build a client and restore any session saved in `session_dir`.
    ///
    /// An unreadable session file is discarded and the client starts
    /// logged out.
    pub fn new(base_url: &str, session_dir: impl AsRef<Path>) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let sessions = SessionStore::new(session_dir);

        let session = match sessions.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(path = %sessions.path().display(), error = %e, "Discarding unreadable session");
                sessions.clear()?;
                None
            }
        };

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            sessions,
            session,
        })
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn user(&self) -> Option<&PublicUser> {
        self.session.as_ref().and_then(|s| s.user.as_ref())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub async fn register(&mut self, request: &RegisterRequest) -> Result<PublicUser, ClientError> {
        let response: AuthResponse = self
            .send(self.request(Method::POST, "/auth/register").json(request))
            .await?;
        self.store_session(response)
    }

    pub async fn login(&mut self, request: &LoginRequest) -> Result<PublicUser, ClientError> {
        let response: AuthResponse = self
            .send(self.request(Method::POST, "/auth/login").json(request))
            .await?;
        self.store_session(response)
    }

    /// Forget the session locally. Tokens are not revoked server side.
    pub fn logout(&mut self) -> Result<(), ClientError> {
        self.session = None;
        self.sessions.clear()
    }

    /// Re-fetch the current user. Any failure logs the client out.
    pub async fn refresh_session(&mut self) -> Result<Option<PublicUser>, ClientError> {
        let Some(token) = self.token().map(str::to_string) else {
            return Ok(None);
        };

        let result = self
            .send::<MeResponse>(self.request(Method::GET, "/auth/me"))
            .await;
        match result {
            Ok(me) => {
                let session = Session {
                    user: Some(me.user.clone()),
                    token,
                };
                self.sessions.save(&session)?;
                self.session = Some(session);
                Ok(Some(me.user))
            }
            Err(e) => {
                tracing::info!(error = %e, "Session refresh failed, logging out");
                self.logout()?;
                Ok(None)
            }
        }
    }

    pub async fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>, ClientError> {
        self.send(self.request(Method::GET, "/posts").query(query))
            .await
    }

    pub async fn get_post(&self, post_id: &str) -> Result<Post, ClientError> {
        self.send(self.request(Method::GET, &format!("/posts/{post_id}")))
            .await
    }

    pub async fn create_post(&self, request: &CreatePostRequest) -> Result<Post, ClientError> {
        self.send(self.request(Method::POST, "/posts").json(request))
            .await
    }

    pub async fn update_post(
        &self,
        post_id: &str,
        request: &UpdatePostRequest,
    ) -> Result<Post, ClientError> {
        self.send(
            self.request(Method::PUT, &format!("/posts/{post_id}"))
                .json(request),
        )
        .await
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<DeletePostResponse, ClientError> {
        self.send(self.request(Method::DELETE, &format!("/posts/{post_id}")))
            .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match self.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        Ok(check_status(response).await?.json().await?)
    }

    fn store_session(&mut self, response: AuthResponse) -> Result<PublicUser, ClientError> {
        let session = Session {
            user: Some(response.user.clone()),
            token: response.token,
        };
        self.sessions.save(&session)?;
        self.session = Some(session);
        Ok(response.user)
    }
}

async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let (message, errors) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.error.unwrap_or_else(|| status.to_string()), body.errors),
        Err(_) => (status.to_string(), Vec::new()),
    };

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::test_support::test_state;
    use std::net::SocketAddr;
    use tempfile::TempDir;

    async fn spawn_server() -> (SocketAddr, TempDir) {
        let (state, dir) = test_state();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        (addr, dir)
    }

    fn registration() -> RegisterRequest {
        RegisterRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "password123".to_string(),
        }
    }

    fn post_request(title: &str) -> CreatePostRequest {
        CreatePostRequest {
            title: title.to_string(),
            content: "This is a test post content".to_string(),
            category: "testing".to_string(),
        }
    }

    #[tokio::test]
    async fn session_survives_restart() {
        let (addr, _server_dir) = spawn_server().await;
        let base = format!("http://{addr}/api");
        let client_dir = TempDir::new().unwrap();

        let mut client = ApiClient::new(&base, client_dir.path()).unwrap();
        assert!(!client.is_authenticated());
        let user = client.register(&registration()).await.unwrap();
        assert_eq!(user.username, "alice");

        let mut restarted = ApiClient::new(&base, client_dir.path()).unwrap();
        assert_eq!(restarted.token(), client.token());
        let refreshed = restarted.refresh_session().await.unwrap();
        assert_eq!(refreshed.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn post_crud_uses_bearer_token() {
        let (addr, _server_dir) = spawn_server().await;
        let client_dir = TempDir::new().unwrap();
        let mut client = ApiClient::new(&format!("http://{addr}/api"), client_dir.path()).unwrap();
        client.register(&registration()).await.unwrap();

        let post = client.create_post(&post_request("Client Post")).await.unwrap();
        assert_eq!(post.slug, "client-post");

        let updated = client
            .update_post(
                &post.id,
                &UpdatePostRequest {
                    content: Some("Updated content from the client".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.content, "Updated content from the client");

        let listed = client.list_posts(&PostQuery::default()).await.unwrap();
        assert_eq!(listed.len(), 1);

        let deleted = client.delete_post(&post.id).await.unwrap();
        assert!(deleted.success);

        let err = client.get_post(&post.id).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn logged_out_client_cannot_create() {
        let (addr, _server_dir) = spawn_server().await;
        let client_dir = TempDir::new().unwrap();
        let mut client = ApiClient::new(&format!("http://{addr}/api"), client_dir.path()).unwrap();
        client.register(&registration()).await.unwrap();
        client.logout().unwrap();

        let err = client.create_post(&post_request("Nope Post")).await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(SessionStore::new(client_dir.path()).load().unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_token_is_dropped_on_refresh() {
        let (addr, _server_dir) = spawn_server().await;
        let client_dir = TempDir::new().unwrap();
        SessionStore::new(client_dir.path())
            .save(&Session {
                user: None,
                token: "not-a-token".to_string(),
            })
            .unwrap();

        let mut client = ApiClient::new(&format!("http://{addr}/api"), client_dir.path()).unwrap();
        assert!(client.is_authenticated());
        assert_eq!(client.refresh_session().await.unwrap(), None);
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn validation_errors_are_surfaced() {
        let (addr, _server_dir) = spawn_server().await;
        let client_dir = TempDir::new().unwrap();
        let mut client = ApiClient::new(&format!("http://{addr}/api"), client_dir.path()).unwrap();

        let err = client
            .register(&RegisterRequest {
                username: "a".to_string(),
                email: "bad".to_string(),
                password: "x".to_string(),
            })
            .await
            .unwrap_err();
        match err {
            ClientError::Api { status, errors, .. } => {
                assert_eq!(status, 400);
                assert!(!errors.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn corrupt_session_starts_logged_out() {
        let client_dir = TempDir::new().unwrap();
        std::fs::write(client_dir.path().join(session::SESSION_FILE_NAME), "garbage").unwrap();

        let client = ApiClient::new("http://localhost:5000/api", client_dir.path()).unwrap();
        assert!(!client.is_authenticated());
    }
}
