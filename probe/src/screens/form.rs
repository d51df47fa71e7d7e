//! Field checks shared by the forms.

use std::sync::OnceLock;

use regex::Regex;
use roadmap::FieldError;

use crate::error::AppError;

pub(crate) const MIN_PASSWORD_CHARS: usize = 6;

static EMAIL: OnceLock<Regex> = OnceLock::new();

fn email_pattern() -> &'static Regex {
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"))
}

/// Collects field errors in form order.
#[derive(Debug, Default)]
pub(crate) struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn email(mut self, field: &str, value: &str) -> Self {
        if !email_pattern().is_match(value.trim()) {
            self.errors
                .push(FieldError::new(field, "Please enter a valid email address"));
        }
        self
    }

    pub fn min_chars(mut self, field: &str, value: &str, min: usize, message: &str) -> Self {
        if value.trim().chars().count() < min {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    /// Passwords count every character, surrounding spaces included.
    pub fn password(mut self, field: &str, value: &str) -> Self {
        if value.chars().count() < MIN_PASSWORD_CHARS {
            self.errors
                .push(FieldError::new(field, "Password must be at least 6 characters"));
        }
        self
    }

    pub fn matches(mut self, field: &str, a: &str, b: &str) -> Self {
        if a != b {
            self.errors.push(FieldError::new(field, "Passwords don't match"));
        }
        self
    }

    pub fn extend(mut self, errors: Vec<FieldError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn push(mut self, field: &str, message: impl Into<String>) -> Self {
        self.errors.push(FieldError::new(field, message));
        self
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}
