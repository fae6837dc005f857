// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Credential hashing, session tokens and request authentication.
//!
//! ## Auth Flow
//!
//! 1. Client registers or logs in with email + password
//! 2. Server checks the bcrypt hash and issues an HS256 session token
//!    carrying `{ id, email, role, iat, exp }`
//! 3. Client sends `Authorization: Bearer <token>` on later requests
//! 4. Server:
//!    - Verifies signature and expiry (no clock leeway)
//!    - Reloads the user by id (deleted accounts fail closed)
//!    - Attaches an `AuthenticatedUser` to the request
//!
//! Tokens are stateless. Logging out only discards the token client side.

pub mod claims;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod roles;
pub mod token;

pub use claims::{AuthenticatedUser, TokenClaims};
pub use error::AuthError;
pub use extractor::Auth;
pub use roles::{AllowedRoles, Role};
pub use token::TokenService;
