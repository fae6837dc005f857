// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{password::DEFAULT_COST, TokenService};
use crate::storage::DocumentStore;

#[derive(Clone)]
pub struct AppState {
    storage: Arc<DocumentStore>,
    pub tokens: Arc<TokenService>,
    /// bcrypt cost for new password hashes
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(storage: DocumentStore, tokens: TokenService) -> Self {
        Self {
            storage: Arc::new(storage),
            tokens: Arc::new(tokens),
            bcrypt_cost: DEFAULT_COST,
        }
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub fn storage(&self) -> &DocumentStore {
        &self.storage
    }
}
