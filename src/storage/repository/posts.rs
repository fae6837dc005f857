// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Post repository.
//!
//! Each post is stored as a separate JSON file under `posts/`. The slug is
//! unique across the collection; uniqueness is enforced with a
//! check-then-write, so two concurrent creates with the same title can both
//! pass the check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::{timed, DocumentStore, OwnedResource, StorageError, StorageResult};
use super::canonical_id;

const COLLECTION: &str = "posts";

/// Post stored in the document store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredPost {
    /// Unique post identifier (UUID)
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    /// URL-safe identifier derived from the title
    pub slug: String,
    /// Owner user ID, set at creation
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for StoredPost {
    fn owner_user_id(&self) -> &str {
        &self.author
    }

    fn resource_label(&self) -> String {
        format!("post {}", self.id)
    }
}

/// Filter and page selection for listing posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFilter {
    /// Exact category match
    pub category: Option<String>,
    /// 1-based page number
    pub page: usize,
    /// Page size
    pub limit: usize,
}

impl Default for PostFilter {
    fn default() -> Self {
        Self {
            category: None,
            page: 1,
            limit: 10,
        }
    }
}

impl PostFilter {
    fn skip(&self) -> usize {
        self.page.max(1).saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Repository for post operations.
pub struct PostRepository<'a> {
    storage: &'a DocumentStore,
}

impl<'a> PostRepository<'a> {
    /// Create a new PostRepository.
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self { storage }
    }

    /// Get a post by ID. Malformed ids are reported as not found.
    pub fn get(&self, post_id: &str) -> StorageResult<StoredPost> {
        let id = canonical_id(post_id)
            .ok_or_else(|| StorageError::NotFound(format!("Post {post_id}")))?;
        let path = self.storage.paths().post(&id);
        timed(COLLECTION, "find_by_id", || {
            if !self.storage.exists(&path) {
                return Err(StorageError::NotFound(format!("Post {id}")));
            }
            self.storage.read_json(&path)
        })
    }

    /// Find the post that owns a slug.
    pub fn find_by_slug(&self, slug: &str) -> StorageResult<Option<StoredPost>> {
        timed(COLLECTION, "find_by_slug", || {
            Ok(self.list_all()?.into_iter().find(|post| post.slug == slug))
        })
    }

    /// Create a new post.
    ///
    /// Fails with `AlreadyExists` if another post already has the same slug.
    pub fn create(&self, post: &StoredPost) -> StorageResult<()> {
        if self.find_by_slug(&post.slug)?.is_some() {
            return Err(StorageError::AlreadyExists(format!("Post slug {}", post.slug)));
        }

        let path = self.storage.paths().post(&post.id);
        timed(COLLECTION, "insert", || {
            if self.storage.exists(&path) {
                return Err(StorageError::AlreadyExists(format!("Post {}", post.id)));
            }
            self.storage.write_json(&path, post)
        })
    }

    /// Replace an existing post.
    ///
    /// Fails with `AlreadyExists` if the (possibly new) slug belongs to a
    /// different post.
    pub fn update(&self, post: &StoredPost) -> StorageResult<()> {
        if let Some(other) = self.find_by_slug(&post.slug)? {
            if other.id != post.id {
                return Err(StorageError::AlreadyExists(format!("Post slug {}", post.slug)));
            }
        }

        let path = self.storage.paths().post(&post.id);
        timed(COLLECTION, "update_by_id", || {
            if !self.storage.exists(&path) {
                return Err(StorageError::NotFound(format!("Post {}", post.id)));
            }
            self.storage.write_json(&path, post)
        })
    }

    /// Delete a post.
    pub fn delete(&self, post_id: &str) -> StorageResult<()> {
        let id = canonical_id(post_id)
            .ok_or_else(|| StorageError::NotFound(format!("Post {post_id}")))?;
        let path = self.storage.paths().post(&id);
        timed(COLLECTION, "delete_by_id", || {
            if !self.storage.exists(&path) {
                return Err(StorageError::NotFound(format!("Post {id}")));
            }
            self.storage.delete(&path)
        })
    }

    /// List posts matching a filter, newest first.
    pub fn list(&self, filter: &PostFilter) -> StorageResult<Vec<StoredPost>> {
        timed(COLLECTION, "find", || {
            let mut posts: Vec<StoredPost> = self
                .list_all()?
                .into_iter()
                .filter(|post| {
                    filter
                        .category
                        .as_ref()
                        .is_none_or(|category| &post.category == category)
                })
                .collect();

            posts.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| b.id.cmp(&a.id))
            });

            Ok(posts
                .into_iter()
                .skip(filter.skip())
                .take(filter.limit)
                .collect())
        })
    }

    /// List every post, in no particular order.
    pub fn list_all(&self) -> StorageResult<Vec<StoredPost>> {
        let ids = self.storage.list_ids(self.storage.paths().posts_dir())?;

        let mut posts = Vec::with_capacity(ids.len());
        for id in ids {
            match self.storage.read_json::<StoredPost>(self.storage.paths().post(&id)) {
                Ok(post) => posts.push(post),
                Err(e) => tracing::warn!(post_id = %id, error = %e, "Skipping unreadable post document"),
            }
        }
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoragePaths;
    use chrono::Duration;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn test_store() -> (DocumentStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = DocumentStore::new(StoragePaths::new(temp_dir.path()));
        store.initialize().expect("Failed to initialize");
        (store, temp_dir)
    }

    fn test_post(slug: &str, category: &str) -> StoredPost {
        StoredPost {
            id: uuid::Uuid::new_v4().to_string(),
            title: slug.replace('-', " "),
            content: "Some long enough content".to_string(),
            category: category.to_string(),
            slug: slug.to_string(),
            author: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn create_and_get_post() {
        let (store, _dir) = test_store();
        let repo = PostRepository::new(&store);

        let post = test_post("first-post", "general");
        repo.create(&post).unwrap();

        assert_eq!(repo.get(&post.id).unwrap(), post);
    }

    #[test]
    fn duplicate_slug_is_rejected() {
        let (store, _dir) = test_store();
        let repo = PostRepository::new(&store);

        repo.create(&test_post("hello-world", "general")).unwrap();
        let result = repo.create(&test_post("hello-world", "other"));
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
    }

    #[test]
    fn update_keeping_own_slug_succeeds() {
        let (store, _dir) = test_store();
        let repo = PostRepository::new(&store);

        let mut post = test_post("stable-slug", "general");
        repo.create(&post).unwrap();

        post.content = "Rewritten content body".to_string();
        repo.update(&post).unwrap();
        assert_eq!(repo.get(&post.id).unwrap().content, "Rewritten content body");
    }

    #[test]
    fn update_onto_foreign_slug_is_rejected() {
        let (store, _dir) = test_store();
        let repo = PostRepository::new(&store);

        repo.create(&test_post("taken", "general")).unwrap();
        let mut post = test_post("mine", "general");
        repo.create(&post).unwrap();

        post.slug = "taken".to_string();
        assert!(matches!(repo.update(&post), Err(StorageError::AlreadyExists(_))));
    }

    #[test]
    fn delete_then_get_is_not_found() {
        let (store, _dir) = test_store();
        let repo = PostRepository::new(&store);

        let post = test_post("short-lived", "general");
        repo.create(&post).unwrap();
        repo.delete(&post.id).unwrap();

        assert!(matches!(repo.get(&post.id), Err(StorageError::NotFound(_))));
        assert!(matches!(repo.delete(&post.id), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn list_paginates_without_overlap() {
        let (store, _dir) = test_store();
        let repo = PostRepository::new(&store);

        let base = Utc::now();
        for i in 0..15 {
            let mut post = test_post(&format!("pagination-post-{i}"), "paging");
            post.created_at = base - Duration::seconds(i);
            repo.create(&post).unwrap();
        }

        let first = repo
            .list(&PostFilter { category: None, page: 1, limit: 10 })
            .unwrap();
        let second = repo
            .list(&PostFilter { category: None, page: 2, limit: 10 })
            .unwrap();

        assert_eq!(first.len(), 10);
        assert_eq!(second.len(), 5);

        let first_ids: HashSet<_> = first.iter().map(|p| p.id.clone()).collect();
        assert!(second.iter().all(|p| !first_ids.contains(&p.id)));

        // Newest first
        assert_eq!(first[0].slug, "pagination-post-0");
        assert_eq!(second[4].slug, "pagination-post-14");
    }

    #[test]
    fn list_filters_by_category() {
        let (store, _dir) = test_store();
        let repo = PostRepository::new(&store);

        repo.create(&test_post("rust-one", "rust")).unwrap();
        repo.create(&test_post("rust-two", "rust")).unwrap();
        repo.create(&test_post("go-one", "go")).unwrap();

        let rust = repo
            .list(&PostFilter {
                category: Some("rust".to_string()),
                ..PostFilter::default()
            })
            .unwrap();
        assert_eq!(rust.len(), 2);
        assert!(rust.iter().all(|p| p.category == "rust"));
    }

    #[test]
    fn page_zero_is_treated_as_first_page() {
        let filter = PostFilter { category: None, page: 0, limit: 10 };
        assert_eq!(filter.skip(), 0);
    }
}
