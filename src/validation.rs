// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request validation rules.
//!
//! Each `validate_*` function trims and normalizes its input and returns
//! the cleaned request, or every rule that failed.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{
    slugify, CreatePostRequest, LoginRequest, RegisterRequest, UpdatePostRequest,
};

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{3,20}$").expect("username pattern compiles"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

pub const MIN_PASSWORD_LEN: usize = 8;
pub const TITLE_LEN: (usize, usize) = (3, 200);
pub const MIN_CONTENT_LEN: usize = 10;
pub const CATEGORY_LEN: (usize, usize) = (2, 30);

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every rule that failed for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(|e| e.field.as_str()).collect()
    }

    /// First message, used as the top-level `error` string.
    pub fn summary(&self) -> String {
        self.0
            .first()
            .map(|e| e.message.clone())
            .unwrap_or_else(|| "Validation failed".to_string())
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

pub fn is_valid_username(username: &str) -> bool {
    USERNAME_RE.is_match(username)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Password problems, in rule order. Empty means the password is acceptable.
pub fn password_problems(password: &str) -> Vec<&'static str> {
    let mut problems = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LEN {
        problems.push("Password must be at least 8 characters");
    }
    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        problems.push("Password must contain at least one letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        problems.push("Password must contain at least one number");
    }
    problems
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn check_title(errors: &mut ValidationErrors, title: &str) {
    let len = char_len(title);
    if len < TITLE_LEN.0 || len > TITLE_LEN.1 {
        errors.push("title", "Title must be between 3 and 200 characters");
    } else if slugify(title).is_empty() {
        errors.push("title", "Title must contain at least one letter or number");
    }
}

fn check_content(errors: &mut ValidationErrors, content: &str) {
    if char_len(content) < MIN_CONTENT_LEN {
        errors.push("content", "Content must be at least 10 characters");
    }
}

fn check_category(errors: &mut ValidationErrors, category: &str) {
    if category.is_empty() {
        errors.push("category", "Category is required");
        return;
    }
    let len = char_len(category);
    if len < CATEGORY_LEN.0 || len > CATEGORY_LEN.1 {
        errors.push("category", "Category must be between 2 and 30 characters");
    }
}

pub fn validate_registration(request: RegisterRequest) -> Result<RegisterRequest, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let username = request.username.trim().to_string();
    if char_len(&username) < 3 || char_len(&username) > 20 {
        errors.push("username", "Username must be between 3 and 20 characters");
    } else if !is_valid_username(&username) {
        errors.push("username", "Username must contain only alphanumeric characters");
    }

    let email = request.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        errors.push("email", "Please provide a valid email");
    }

    for problem in password_problems(&request.password) {
        errors.push("password", problem);
    }

    errors.finish(RegisterRequest {
        username,
        email,
        password: request.password,
    })
}

pub fn validate_login(request: LoginRequest) -> Result<LoginRequest, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let email = request.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        errors.push("email", "Please provide a valid email");
    }
    if request.password.is_empty() {
        errors.push("password", "Password is required");
    }

    errors.finish(LoginRequest {
        email,
        password: request.password,
    })
}

pub fn validate_new_post(request: CreatePostRequest) -> Result<CreatePostRequest, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let cleaned = CreatePostRequest {
        title: request.title.trim().to_string(),
        content: request.content.trim().to_string(),
        category: request.category.trim().to_string(),
    };

    check_title(&mut errors, &cleaned.title);
    check_content(&mut errors, &cleaned.content);
    check_category(&mut errors, &cleaned.category);

    errors.finish(cleaned)
}

pub fn validate_post_update(request: UpdatePostRequest) -> Result<UpdatePostRequest, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let trim = |value: Option<String>| value.map(|v| v.trim().to_string());
    let cleaned = UpdatePostRequest {
        title: trim(request.title),
        content: trim(request.content),
        category: trim(request.category),
    };

    if let Some(title) = &cleaned.title {
        check_title(&mut errors, title);
    }
    if let Some(content) = &cleaned.content {
        check_content(&mut errors, content);
    }
    if let Some(category) = &cleaned.category {
        check_category(&mut errors, category);
    }

    errors.finish(cleaned)
}
