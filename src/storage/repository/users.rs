// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User repository (credential store).
//!
//! Each user is stored as a separate JSON file under `users/`. The stored
//! record carries the bcrypt hash; it is never serialized into an API
//! response (see [`crate::models::PublicUser`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::{timed, DocumentStore, StorageError, StorageResult};
use super::canonical_id;
use crate::auth::Role;

const COLLECTION: &str = "users";

/// User record as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredUser {
    /// Unique user identifier (UUID)
    pub id: String,
    /// Unique alphanumeric username
    pub username: String,
    /// Unique, lowercased email address
    pub email: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    /// Authorization role
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Repository for user operations.
pub struct UserRepository<'a> {
    storage: &'a DocumentStore,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository.
    pub fn new(storage: &'a DocumentStore) -> Self {
        Self { storage }
    }

    /// Get a user by ID. Malformed ids are reported as not found.
    pub fn get(&self, user_id: &str) -> StorageResult<StoredUser> {
        let id = canonical_id(user_id)
            .ok_or_else(|| StorageError::NotFound(format!("User {user_id}")))?;
        let path = self.storage.paths().user(&id);
        timed(COLLECTION, "find_by_id", || {
            if !self.storage.exists(&path) {
                return Err(StorageError::NotFound(format!("User {id}")));
            }
            self.storage.read_json(&path)
        })
    }

    /// Find a user by email (case-insensitive).
    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<StoredUser>> {
        let email = email.trim().to_lowercase();
        timed(COLLECTION, "find_by_email", || {
            Ok(self.list_all()?.into_iter().find(|user| user.email == email))
        })
    }

    /// Find any user whose email or username matches.
    pub fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> StorageResult<Option<StoredUser>> {
        let email = email.trim().to_lowercase();
        timed(COLLECTION, "find_by_email_or_username", || {
            Ok(self
                .list_all()?
                .into_iter()
                .find(|user| user.email == email || user.username == username))
        })
    }

    /// Create a new user.
    ///
    /// Fails with `AlreadyExists` if the id, email or username is taken.
    /// The uniqueness check and the write are separate steps.
    pub fn create(&self, user: &StoredUser) -> StorageResult<()> {
        if self
            .find_by_email_or_username(&user.email, &user.username)?
            .is_some()
        {
            return Err(StorageError::AlreadyExists(format!(
                "User {} / {}",
                user.username, user.email
            )));
        }

        let path = self.storage.paths().user(&user.id);
        timed(COLLECTION, "insert", || {
            if self.storage.exists(&path) {
                return Err(StorageError::AlreadyExists(format!("User {}", user.id)));
            }
            self.storage.write_json(&path, user)
        })
    }

    /// List all users.
    pub fn list_all(&self) -> StorageResult<Vec<StoredUser>> {
        let ids = self.storage.list_ids(self.storage.paths().users_dir())?;

        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            match self.storage.read_json::<StoredUser>(self.storage.paths().user(&id)) {
                Ok(user) => users.push(user),
                Err(e) => tracing::warn!(user_id = %id, error = %e, "Skipping unreadable user document"),
            }
        }
        Ok(users)
    }
}
