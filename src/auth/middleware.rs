// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and role-gate middleware for Axum.
//!
//! `authenticate` is applied as a route layer on protected routes:
//!
//! ```text
//! no Authorization header      -> 401
//! header present -> verify     -> bad/expired token      -> 401
//!                              -> user no longer exists  -> 401
//!                              -> ok: AuthenticatedUser in extensions, run handler
//! ```
//!
//! `require_roles` runs after `authenticate` and checks the attached
//! identity against an explicit [`AllowedRoles`] list.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{AllowedRoles, AuthError, AuthenticatedUser};
use crate::state::AppState;
use crate::storage::{StorageError, UserRepository};

/// Pull the bearer token out of the request headers.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MissingAuthHeader);
    }

    Ok(token)
}

/// Verify the bearer token and load the account it names.
pub fn authenticate_headers(
    headers: &HeaderMap,
    state: &AppState,
) -> Result<AuthenticatedUser, AuthError> {
    let token = bearer_token(headers)?;
    let claims = state.tokens.verify_token(token)?;

    let user = UserRepository::new(state.storage())
        .get(&claims.id)
        .map_err(|e| match e {
            StorageError::NotFound(_) => {
                tracing::debug!(user_id = %claims.id, "Token for missing account");
                AuthError::UnknownUser
            }
            other => AuthError::InternalError(format!("failed to load user: {other}")),
        })?;

    Ok(user.into())
}

/// Authentication middleware function.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate_headers(request.headers(), &state) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Role gate. Use with `from_fn_with_state(AllowedRoles::ADMIN, require_roles)`.
pub async fn require_roles(
    State(allowed): State<AllowedRoles>,
    request: Request,
    next: Next,
) -> Response {
    let Some(user) = request.extensions().get::<AuthenticatedUser>() else {
        return AuthError::AuthenticationRequired.into_response();
    };

    if !allowed.permits(user.role) {
        tracing::info!(user_id = %user.user_id, role = %user.role, "Role not permitted");
        return AuthError::InsufficientPermissions.into_response();
    }

    next.run(request).await
}
