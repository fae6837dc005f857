// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Knowledge Base Server - Auth + Posts REST API
//!
//! This crate provides a JSON-document backed REST API for user accounts
//! and a posts knowledge base, plus a Rust client that keeps a persisted
//! session.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Password hashing, session tokens, middleware and role gate
//! - `client` - API client with a file-backed session cache
//! - `storage` - JSON document store and repositories

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;
