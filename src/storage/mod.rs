// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Document Storage Module
//!
//! Persistent storage as JSON documents on the local filesystem, one file
//! per document. Every operation touches a single document; there are no
//! multi-document transactions.
//!
//! ## Storage Layout
//!
//! ```text
//! $DATA_DIR/
//!   users/
//!     {user_id}.json   # Credential record (bcrypt hash, role)
//!   posts/
//!     {post_id}.json   # Post document (author = owning user id)
//! ```

pub mod document_store;
pub mod ownership;
pub mod paths;
pub mod repository;
pub mod timing;

pub use document_store::{DocumentStore, StorageError, StorageResult};
pub use ownership::{OwnedResource, OwnershipEnforcer};
pub use paths::StoragePaths;
pub use repository::{PostRepository, StoredPost, StoredUser, UserRepository};
pub use timing::timed;
