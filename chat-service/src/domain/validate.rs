//! Request body validation
//!
//! Inputs implement [`Validate`] by feeding their fields through a
//! [`Violations`] collector. Every failing rule contributes one message, so a
//! client sees all problems with a body at once.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use uuid::Uuid;

/// E.164 phone numbers
static E164: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9][0-9]{6,14}$").expect("E.164 regex is valid"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$").expect("email regex is valid")
});

/// A rejected request body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation failed: {}", .fields.join("; "))]
pub struct ValidationError {
    /// One message per failed rule
    pub fields: Vec<String>,
}

/// Request bodies that check themselves before reaching a service
pub trait Validate {
    /// All rule violations of `self`, or `Ok` when there are none
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Collects rule violations for one body
#[derive(Debug, Default)]
pub struct Violations {
    fields: Vec<String>,
}

impl Violations {
    /// Empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// `value` must not be blank
    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.fields.push(format!("{} is required", field));
        }
        self
    }

    /// `value` must not be the nil UUID
    pub fn required_id(&mut self, field: &str, value: Uuid) -> &mut Self {
        if value.is_nil() {
            self.fields.push(format!("{} is required", field));
        }
        self
    }

    /// `value`, when present, must be an E.164 phone number
    pub fn mobile(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.is_empty() && !E164.is_match(value) {
            self.fields
                .push(format!("{} is an invalid mobile number", field));
        }
        self
    }

    /// `value`, when present, must look like an email address
    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.is_empty() && !EMAIL.is_match(value) {
            self.fields
                .push(format!("{} is an invalid email address", field));
        }
        self
    }

    /// `value`, when present, must be one of `allowed`
    pub fn one_of(&mut self, field: &str, value: &str, allowed: &[&str]) -> &mut Self {
        if !value.is_empty() && !allowed.contains(&value) {
            self.fields.push(format!(
                "{} must be one of {}",
                field,
                allowed.join(" ")
            ));
        }
        self
    }

    /// `value` must not exceed `max` characters
    pub fn max_len(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.fields
                .push(format!("{} must not exceed {} characters", field, max));
        }
        self
    }

    /// `Ok` when no rule failed
    pub fn finish(&mut self) -> Result<(), ValidationError> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                fields: std::mem::take(&mut self.fields),
            })
        }
    }
}
