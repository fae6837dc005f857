// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::collections::HashMap;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use super::JsonBody;
use crate::{
    auth::Auth,
    error::ApiError,
    models::{slugify, CreatePostRequest, DeletePostResponse, Post, PostAuthor, UpdatePostRequest},
    state::AppState,
    storage::{
        repository::posts::PostFilter, OwnershipEnforcer, PostRepository, StorageError,
        StoredPost, UserRepository,
    },
    validation::{validate_new_post, validate_post_update},
};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

const POST_NOT_FOUND: &str = "Post not found";
const DUPLICATE_TITLE: &str = "A post with this title already exists";

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPostsQuery {
    /// Exact category match
    pub category: Option<String>,
    /// 1-based page number (default 1)
    pub page: Option<usize>,
    /// Page size (default 10, max 100)
    pub limit: Option<usize>,
}

impl ListPostsQuery {
    fn into_filter(self) -> PostFilter {
        PostFilter {
            category: self.category.filter(|c| !c.trim().is_empty()),
            page: self.page.unwrap_or(1).max(1),
            limit: self
                .limit
                .filter(|limit| *limit > 0)
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .min(MAX_PAGE_SIZE),
        }
    }
}

fn post_lookup_error(e: StorageError) -> ApiError {
    match e {
        StorageError::NotFound(_) => ApiError::not_found(POST_NOT_FOUND),
        other => other.into(),
    }
}

fn slug_conflict_error(e: StorageError) -> ApiError {
    match e {
        StorageError::AlreadyExists(_) => ApiError::bad_request(DUPLICATE_TITLE),
        other => other.into(),
    }
}

/// Resolve a post's author. A deleted account yields `None`.
fn load_author(state: &AppState, author_id: &str) -> Result<Option<PostAuthor>, ApiError> {
    match UserRepository::new(state.storage()).get(author_id) {
        Ok(user) => Ok(Some(PostAuthor::from(&user))),
        Err(StorageError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn populate(state: &AppState, post: StoredPost) -> Result<Post, ApiError> {
    let author = load_author(state, &post.author)?;
    Ok(Post::from_stored(post, author))
}

#[utoipa::path(
    get,
    path = "/api/posts",
    params(ListPostsQuery),
    tag = "Posts",
    responses((status = 200, body = [Post]))
)]
pub async fn list_posts(
    State(state): State<AppState>,
    query: Result<Query<ListPostsQuery>, QueryRejection>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let posts = PostRepository::new(state.storage()).list(&query.into_filter())?;

    let mut authors: HashMap<String, Option<PostAuthor>> = HashMap::new();
    let mut populated = Vec::with_capacity(posts.len());
    for post in posts {
        let author = match authors.get(&post.author) {
            Some(author) => author.clone(),
            None => {
                let author = load_author(&state, &post.author)?;
                authors.insert(post.author.clone(), author.clone());
                author
            }
        };
        populated.push(Post::from_stored(post, author));
    }

    Ok(Json(populated))
}

#[utoipa::path(
    get,
    path = "/api/posts/{post_id}",
    params(("post_id" = String, Path, description = "Post identifier")),
    tag = "Posts",
    responses(
        (status = 200, body = Post),
        (status = 404, description = "Post not found")
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let post = PostRepository::new(state.storage())
        .get(&post_id)
        .map_err(post_lookup_error)?;
    Ok(Json(populate(&state, post)?))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = CreatePostRequest,
    tag = "Posts",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, body = Post),
        (status = 400, description = "Validation failed or duplicate title"),
        (status = 401, description = "Missing, invalid or expired token")
    )
)]
pub async fn create_post(
    Auth(user): Auth,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let request = validate_new_post(request)?;
    let posts = PostRepository::new(state.storage());

    let now = Utc::now();
    let post = StoredPost {
        id: uuid::Uuid::new_v4().to_string(),
        slug: slugify(&request.title),
        title: request.title,
        content: request.content,
        category: request.category,
        author: user.user_id.clone(),
        created_at: now,
        updated_at: now,
    };

    posts.create(&post).map_err(slug_conflict_error)?;
    tracing::info!(post_id = %post.id, user_id = %user.user_id, slug = %post.slug, "Post created");

    let created = posts.get(&post.id)?;
    Ok((StatusCode::CREATED, Json(populate(&state, created)?)))
}

#[utoipa::path(
    put,
    path = "/api/posts/{post_id}",
    params(("post_id" = String, Path, description = "Post identifier")),
    request_body = UpdatePostRequest,
    tag = "Posts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = Post),
        (status = 400, description = "Validation failed or duplicate title"),
        (status = 401, description = "Missing, invalid or expired token"),
        (status = 403, description = "Caller does not own the post"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn update_post(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    JsonBody(request): JsonBody<UpdatePostRequest>,
) -> Result<Json<Post>, ApiError> {
    let request = validate_post_update(request)?;
    let posts = PostRepository::new(state.storage());

    let mut post = posts.get(&post_id).map_err(post_lookup_error)?;
    if post.verify_ownership(&user).is_err() {
        tracing::info!(post_id = %post.id, user_id = %user.user_id, "Update by non-owner");
        return Err(ApiError::forbidden(
            "You do not have permission to update this post",
        ));
    }

    if let Some(title) = request.title {
        post.slug = slugify(&title);
        post.title = title;
    }
    if let Some(content) = request.content {
        post.content = content;
    }
    if let Some(category) = request.category {
        post.category = category;
    }
    post.updated_at = Utc::now();

    posts.update(&post).map_err(|e| match e {
        StorageError::NotFound(_) => ApiError::not_found(POST_NOT_FOUND),
        other => slug_conflict_error(other),
    })?;
    tracing::info!(post_id = %post.id, user_id = %user.user_id, "Post updated");

    let updated = posts.get(&post.id).map_err(post_lookup_error)?;
    Ok(Json(populate(&state, updated)?))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{post_id}",
    params(("post_id" = String, Path, description = "Post identifier")),
    tag = "Posts",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, body = DeletePostResponse),
        (status = 401, description = "Missing, invalid or expired token"),
        (status = 403, description = "Caller does not own the post"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn delete_post(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<DeletePostResponse>, ApiError> {
    let posts = PostRepository::new(state.storage());

    let post = posts.get(&post_id).map_err(post_lookup_error)?;
    if post.verify_ownership(&user).is_err() {
        tracing::info!(post_id = %post.id, user_id = %user.user_id, "Delete by non-owner");
        return Err(ApiError::forbidden(
            "You do not have permission to delete this post",
        ));
    }

    posts.delete(&post.id).map_err(post_lookup_error)?;
    tracing::info!(post_id = %post.id, user_id = %user.user_id, "Post deleted");

    Ok(Json(DeletePostResponse {
        success: true,
        message: "Post deleted successfully".to_string(),
    }))
}
