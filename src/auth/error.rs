// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication and authorization error type.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Authorization header is not `Bearer <token>`
    InvalidAuthHeader,
    /// Signature invalid, payload malformed, or token expired
    InvalidOrExpiredToken,
    /// Token verified but the account no longer exists
    UnknownUser,
    /// Email/password pair did not match; same for unknown email and wrong password
    InvalidCredentials,
    /// Role gate reached without an authenticated identity
    AuthenticationRequired,
    /// Authenticated, but the role is not on the allow-list
    InsufficientPermissions,
    /// Internal error (hashing or signing failure)
    InternalError(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::InvalidOrExpiredToken => "invalid_or_expired_token",
            AuthError::UnknownUser => "invalid_or_expired_token",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::AuthenticationRequired => "authentication_required",
            AuthError::InsufficientPermissions => "insufficient_permissions",
            AuthError::InternalError(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::InvalidOrExpiredToken
            | AuthError::UnknownUser
            | AuthError::InvalidCredentials
            | AuthError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => {
                write!(f, "No token provided, authorization denied")
            }
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            // A deleted account reads the same as a bad token.
            AuthError::InvalidOrExpiredToken | AuthError::UnknownUser => {
                write!(f, "Token is not valid")
            }
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::AuthenticationRequired => write!(f, "Authentication required"),
            AuthError::InsufficientPermissions => {
                write!(f, "Access denied. Insufficient permissions")
            }
            AuthError::InternalError(_) => write!(f, "Internal server error"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::InternalError(detail) = &self {
            tracing::error!(error = %detail, "Authentication failed internally");
        }

        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
