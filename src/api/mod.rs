// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use axum::{
    body::Body,
    extract::FromRequest,
    http::{Request, Response},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Span;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{middleware::authenticate, AuthenticatedUser, Role},
    error::ApiError,
    models::{
        AuthResponse, CreatePostRequest, DeletePostResponse, LoginRequest, MeResponse, Post,
        PostAuthor, PublicUser, RegisterRequest, UpdatePostRequest,
    },
    state::AppState,
    validation::FieldError,
};

pub mod auth;
pub mod health;
pub mod posts;

/// Requests slower than this are logged at warn level.
pub const SLOW_REQUEST_THRESHOLD: Duration = Duration::from_millis(1000);

/// JSON body extractor whose rejections use the API error shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

pub fn router(state: AppState) -> Router {
    let auth_layer = from_fn_with_state(state.clone(), authenticate);

    let auth_routes = Router::new()
        .route("/me", get(auth::me))
        .route_layer(auth_layer.clone())
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let protected_posts = Router::new()
        .route("/", post(posts::create_post))
        .route("/{post_id}", put(posts::update_post).delete(posts::delete_post))
        .route_layer(auth_layer);

    let post_routes = Router::new()
        .route("/", get(posts::list_posts))
        .route("/{post_id}", get(posts::get_post))
        .merge(protected_posts);

    Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health))
        .nest("/api/auth", auth_routes)
        .nest("/api/posts", post_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(health::route_not_found)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                })
                .on_response(|response: &Response<Body>, latency: Duration, _span: &Span| {
                    let status = response.status().as_u16();
                    let latency_ms = latency.as_millis() as u64;
                    if latency > SLOW_REQUEST_THRESHOLD {
                        tracing::warn!(status, latency_ms, "Slow request");
                    } else {
                        tracing::debug!(status, latency_ms, "Request completed");
                    }
                }),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        auth::me,
        posts::list_posts,
        posts::get_post,
        posts::create_post,
        posts::update_post,
        posts::delete_post,
        health::health,
        health::index
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            MeResponse,
            PublicUser,
            AuthenticatedUser,
            Role,
            CreatePostRequest,
            UpdatePostRequest,
            Post,
            PostAuthor,
            DeletePostResponse,
            FieldError,
            health::HealthResponse,
            health::IndexResponse,
            health::IndexEndpoints,
            health::NotFoundResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Registration, login and session identity"),
        (name = "Posts", description = "Knowledge base posts"),
        (name = "Health", description = "Liveness and service index")
    )
)]
pub struct ApiDoc;
