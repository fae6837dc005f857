// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the document store.
//!
//! Each repository provides CRUD operations for one collection, using the
//! DocumentStore for all file operations.

use uuid::Uuid;

pub mod posts;
pub mod users;

pub use posts::{PostRepository, StoredPost};
pub use users::{StoredUser, UserRepository};

/// Canonical form of a document id, or `None` if it is not a UUID.
///
/// Ids double as file names, so anything that does not parse is rejected
/// before it reaches the filesystem.
pub fn canonical_id(raw: &str) -> Option<String> {
    Uuid::parse_str(raw.trim())
        .ok()
        .map(|id| id.hyphenated().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_id_normalizes_uuid_spellings() {
        let id = Uuid::new_v4();
        let expected = id.to_string();
        assert_eq!(canonical_id(&expected.to_uppercase()), Some(expected.clone()));
        assert_eq!(canonical_id(&id.simple().to_string()), Some(expected));
    }

    #[test]
    fn canonical_id_rejects_malformed_ids() {
        assert_eq!(canonical_id("not-an-id"), None);
        assert_eq!(canonical_id("../users/abc"), None);
        assert_eq!(canonical_id(""), None);
    }
}
