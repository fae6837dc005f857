// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Path constants and utilities for the document store layout.

use std::path::{Path, PathBuf};

/// Default base directory for persisted documents.
pub const DATA_ROOT: &str = "./data";

/// Storage path utilities for the document store.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl StoragePaths {
    /// Create a new StoragePaths with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all documents.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ========== User Paths ==========

    /// Directory containing all user documents.
    pub fn users_dir(&self) -> PathBuf {
        self.root.join("users")
    }

    /// Path to a specific user document.
    pub fn user(&self, user_id: &str) -> PathBuf {
        self.users_dir().join(format!("{user_id}.json"))
    }

    // ========== Post Paths ==========

    /// Directory containing all post documents.
    pub fn posts_dir(&self) -> PathBuf {
        self.root.join("posts")
    }

    /// Path to a specific post document.
    pub fn post(&self, post_id: &str) -> PathBuf {
        self.posts_dir().join(format!("{post_id}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_paths_live_under_their_collection() {
        let paths = StoragePaths::new("/tmp/kb");
        assert_eq!(paths.user("u-1"), PathBuf::from("/tmp/kb/users/u-1.json"));
        assert_eq!(paths.post("p-1"), PathBuf::from("/tmp/kb/posts/p-1.json"));
    }
}
