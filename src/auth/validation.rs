//! Form validation for login and signup.
//!
//! Runs synchronously before any network call. The backend repeats the same
//! checks and returns the resulting field errors with a 422.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{LoginRequest, NewPost, SignupRequest};

/// Field name → messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<BTreeMap<String, Vec<String>>> for ValidationErrors {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        Self(map)
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for m in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {m}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        // Pattern is a compile-time constant and known to be valid.
        #[allow(clippy::expect_used)]
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex")
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email.trim())
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.trim().is_empty() {
        errors.add("email", "Email is required.");
    } else if !is_valid_email(email) {
        errors.add("email", "Enter a valid email address.");
    }
}

fn check_password(errors: &mut ValidationErrors, password: &str, min_len: usize) {
    if password.is_empty() {
        errors.add("password", "Password is required.");
    } else if password.chars().count() < min_len {
        errors.add("password", format!("Password must be at least {min_len} characters."));
    }
}

pub fn validate_login(req: &LoginRequest, min_password_len: usize) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_email(&mut errors, &req.email);
    check_password(&mut errors, &req.password, min_password_len);
    errors.into_result()
}

pub fn validate_signup(req: &SignupRequest, min_password_len: usize) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_email(&mut errors, &req.email);
    if req.name.trim().is_empty() {
        errors.add("name", "Name is required.");
    }
    check_password(&mut errors, &req.password, min_password_len);
    if req.password_confirm != req.password {
        errors.add("passwordConfirm", "Passwords do not match.");
    }
    errors.into_result()
}

pub fn validate_post(post: &NewPost, max_title_len: usize) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let title = post.title.trim();
    if title.is_empty() {
        errors.add("title", "Title is required.");
    } else if title.chars().count() > max_title_len {
        errors.add("title", format!("Title must be at most {max_title_len} characters."));
    }
    if post.body.trim().is_empty() {
        errors.add("body", "Body is required.");
    }
    errors.into_result()
}
