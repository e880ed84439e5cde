//! Error types for the todo core.
//!
//! # Design
//! `TodoError` is what the CRUD service returns. `MalformedIdentifier` is kept
//! apart from `NotFound` so logs can tell them apart, but `is_not_found`
//! folds them together for every caller that surfaces errors to a user.
//!
//! `ApiError` is the client-side view: `NotFound` gets a dedicated variant
//! because callers frequently distinguish "the resource does not exist" from
//! "the server returned an unexpected status."

use thiserror::Error;

/// A rejected input field, named in the camelCase form the client sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    pub fn required(field: &'static str) -> Self {
        Self::new(field, REQUIRED)
    }

    /// True when the field was missing or blank rather than malformed.
    pub fn is_required(&self) -> bool {
        self.reason == REQUIRED
    }
}

const REQUIRED: &str = "is required";

/// Failure reported by a storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors returned by `TodoService` operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("todo not found")]
    NotFound,

    #[error("malformed todo id: {0}")]
    MalformedIdentifier(String),

    #[error(transparent)]
    StorageUnavailable(#[from] StoreError),
}

impl TodoError {
    /// True for both a missing record and an id the store could never hold.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TodoError::NotFound | TodoError::MalformedIdentifier(_))
    }
}

/// Errors returned by `TodoClient` parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server returned 404: the requested todo does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404. `message` is the
    /// envelope's human-readable message when the body carried one.
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}
