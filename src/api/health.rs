// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Liveness response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"OK"` while the process is serving
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

/// Top-level endpoint map returned by `GET /`.
#[derive(Debug, Serialize, ToSchema)]
pub struct IndexEndpoints {
    pub auth: String,
    pub posts: String,
    pub health: String,
    pub docs: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IndexResponse {
    pub message: String,
    pub endpoints: IndexEndpoints,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotFoundResponse {
    pub error: String,
}

/// Liveness check handler.
///
/// Always returns 200 if the process is running.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is alive", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        timestamp: Utc::now(),
    })
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, body = IndexResponse))
)]
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Knowledge Base API".to_string(),
        endpoints: IndexEndpoints {
            auth: "/api/auth".to_string(),
            posts: "/api/posts".to_string(),
            health: "/health".to_string(),
            docs: "/docs".to_string(),
        },
    })
}

/// Fallback for unmatched routes.
pub async fn route_not_found() -> (StatusCode, Json<NotFoundResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            error: "Route not found".to_string(),
        }),
    )
}
