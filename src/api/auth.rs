// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use super::JsonBody;
use crate::{
    auth::{
        password::{hash_password, verify_password},
        Auth, AuthError, Role,
    },
    error::ApiError,
    models::{AuthResponse, LoginRequest, MeResponse, PublicUser, RegisterRequest},
    state::AppState,
    storage::{StorageError, StoredUser, UserRepository},
    validation::{validate_login, validate_registration},
};

pub const DUPLICATE_USER_MESSAGE: &str = "User with this email or username already exists";

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    tag = "Auth",
    responses(
        (status = 201, body = AuthResponse),
        (status = 400, description = "Validation failed or user already exists")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let request = validate_registration(request)?;
    let users = UserRepository::new(state.storage());

    if users
        .find_by_email_or_username(&request.email, &request.username)?
        .is_some()
    {
        return Err(ApiError::bad_request(DUPLICATE_USER_MESSAGE));
    }

    let password_hash = hash_password(request.password, state.bcrypt_cost).await?;
    let now = Utc::now();
    let user = StoredUser {
        id: uuid::Uuid::new_v4().to_string(),
        username: request.username,
        email: request.email,
        password_hash,
        role: Role::User,
        created_at: now,
        updated_at: now,
    };

    users.create(&user).map_err(|e| match e {
        StorageError::AlreadyExists(_) => ApiError::bad_request(DUPLICATE_USER_MESSAGE),
        other => other.into(),
    })?;

    let token = state.tokens.generate_token(&user)?;
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            user: PublicUser::from(&user),
            token,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, body = AuthResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let request = validate_login(request)?;

    // Unknown email and wrong password must be indistinguishable.
    let Some(user) = UserRepository::new(state.storage()).find_by_email(&request.email)? else {
        tracing::debug!("Login for unknown email");
        return Err(AuthError::InvalidCredentials.into());
    };

    if !verify_password(request.password, user.password_hash.clone()).await? {
        tracing::debug!(user_id = %user.id, "Login with wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.tokens.generate_token(&user)?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse {
        success: true,
        user: PublicUser::from(&user),
        token,
    }))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = MeResponse),
        (status = 401, description = "Missing, invalid or expired token")
    )
)]
pub async fn me(Auth(user): Auth) -> Json<MeResponse> {
    Json(MeResponse {
        success: true,
        user: PublicUser {
            id: user.user_id,
            username: user.username,
            email: user.email,
            role: user.role,
        },
    })
}
