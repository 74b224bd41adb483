//! Shared primitives for all Rust crates in Lectern.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

/// Uniform tagged result returned at every public operation boundary.
pub mod response;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::UserIdentity;
pub use response::{ResponseKind, ServiceResponse};

/// Result type used across Lectern crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller permissions do not intersect the operation requirement.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Engagement was attempted on content that is still a draft.
    #[error("not published: {0}")]
    NotPublished(String),

    /// A toggle-on was requested while the toggle is already applied.
    #[error("already done: {0}")]
    AlreadyDone(String),

    /// A toggle-off was requested while the toggle is not applied.
    #[error("not done: {0}")]
    NotDone(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP-compatible status code for this error category.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Unauthorized(_)
            | Self::NotPublished(_)
            | Self::AlreadyDone(_)
            | Self::NotDone(_) => 401,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the message safe to show to callers.
    ///
    /// Internal faults never leak their detail.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(message)
            | Self::NotFound(message)
            | Self::Conflict(message)
            | Self::Unauthorized(message)
            | Self::NotPublished(message)
            | Self::AlreadyDone(message)
            | Self::NotDone(message) => message.clone(),
            Self::Internal(_) => "internal server error".to_owned(),
        }
    }
}
