use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Outcome tag carried by every [`ServiceResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// The operation completed.
    Success,
    /// The operation was rejected or failed.
    Error,
}

/// Uniform tagged result `{ type, data, status, message, timestamp }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceResponse<T> {
    /// Success or error tag.
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    /// Payload, present on success.
    pub data: Option<T>,
    /// HTTP-compatible status code.
    pub status: u16,
    /// Human readable outcome.
    pub message: String,
    /// Milliseconds since the Unix epoch when the response was built.
    pub timestamp: i64,
}

impl<T> ServiceResponse<T> {
    /// Builds a success response.
    #[must_use]
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            kind: ResponseKind::Success,
            data: Some(data),
            status: 200,
            message: message.into(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Builds an error response from an application error.
    ///
    /// Internal faults are logged with full detail and reported generically.
    #[must_use]
    pub fn failure(error: &AppError) -> Self {
        if let AppError::Internal(detail) = error {
            tracing::error!(error = %detail, "operation failed with internal fault");
        }

        Self {
            kind: ResponseKind::Error,
            data: None,
            status: error.status_code(),
            message: error.public_message(),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    /// Converts an operation result into the tagged response.
    #[must_use]
    pub fn from_result(result: AppResult<T>, success_message: &str) -> Self {
        match result {
            Ok(data) => Self::success(data, success_message),
            Err(error) => Self::failure(&error),
        }
    }

    /// Returns true when the response carries a success tag.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.kind == ResponseKind::Success
    }

    /// Converts the payload while keeping tag, status, message and timestamp.
    #[must_use]
    pub fn map<U>(self, transform: impl FnOnce(T) -> U) -> ServiceResponse<U> {
        ServiceResponse {
            kind: self.kind,
            data: self.data.map(transform),
            status: self.status,
            message: self.message,
            timestamp: self.timestamp,
        }
    }
}
