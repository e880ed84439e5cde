//! Mapping from service errors to HTTP responses.
//!
//! Not-found covers malformed ids too. Storage failures are logged here and
//! reported as a generic 500.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use todo_core::{Envelope, TodoError};

/// Which operation failed; picks the envelope message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    List,
    Get,
    Create,
    Update,
    Toggle,
    Delete,
    Stats,
}

impl Op {
    fn failure_message(self) -> &'static str {
        match self {
            Op::List => "Server error while fetching todos",
            Op::Get => "Server error",
            Op::Create => "Error creating todo",
            Op::Update => "Error updating todo",
            Op::Toggle => "Error toggling todo",
            Op::Delete => "Error deleting todo",
            Op::Stats => "Error fetching statistics",
        }
    }

    fn rejection_message(self) -> &'static str {
        match self {
            Op::List => "Invalid list parameters",
            other => other.failure_message(),
        }
    }
}

#[derive(Debug)]
pub enum AppError {
    Todo { op: Op, source: TodoError },
    BadJson(JsonRejection),
    BadQuery(QueryRejection),
}

impl AppError {
    pub fn new(op: Op, source: TodoError) -> Self {
        AppError::Todo { op, source }
    }

    /// Curried form for `map_err`.
    pub fn on(op: Op) -> impl FnOnce(TodoError) -> Self {
        move |source| AppError::new(op, source)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadJson(rejection)
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadQuery(rejection)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, envelope) = match self {
            AppError::Todo { source, .. } if source.is_not_found() => {
                tracing::debug!(error = %source, "todo not found");
                (StatusCode::NOT_FOUND, Envelope::failure("Todo not found", None))
            }
            AppError::Todo {
                op,
                source: source @ TodoError::StorageUnavailable(_),
            } => {
                tracing::error!(?op, error = %source, "storage failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Envelope::failure(op.failure_message(), Some(source.to_string())),
                )
            }
            AppError::Todo {
                op: Op::Create,
                source: TodoError::Validation(err),
            } if err.field == "text" && err.is_required() => (
                StatusCode::BAD_REQUEST,
                Envelope::failure("Todo text is required", Some(err.to_string())),
            ),
            AppError::Todo { op, source } => (
                StatusCode::BAD_REQUEST,
                Envelope::failure(op.rejection_message(), Some(source.to_string())),
            ),
            AppError::BadJson(rejection) => (
                StatusCode::BAD_REQUEST,
                Envelope::failure("Invalid JSON body", Some(rejection.body_text())),
            ),
            AppError::BadQuery(rejection) => (
                StatusCode::BAD_REQUEST,
                Envelope::failure("Invalid list parameters", Some(rejection.body_text())),
            ),
        };
        (status, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use rstest::rstest;
    use serde_json::Value;
    use todo_core::{StoreError, ValidationError};

    use super::*;

    #[rstest]
    #[case(TodoError::NotFound, StatusCode::NOT_FOUND)]
    #[case(TodoError::MalformedIdentifier("x".into()), StatusCode::NOT_FOUND)]
    #[case(
        TodoError::Validation(ValidationError::new("text", "is required")),
        StatusCode::BAD_REQUEST
    )]
    #[case(
        TodoError::StorageUnavailable(StoreError::Unavailable("down".into())),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    fn status_mapping(#[case] source: TodoError, #[case] expected: StatusCode) {
        let response = AppError::new(Op::Update, source).into_response();
        assert_eq!(response.status(), expected);
    }

    async fn message_of(err: AppError) -> Value {
        let bytes = err.into_response().into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        json["message"].clone()
    }

    #[rstest]
    #[case(Op::Create, ValidationError::required("text"), "Todo text is required")]
    #[case(Op::Create, ValidationError::new("text", "cannot exceed 500 characters"), "Error creating todo")]
    #[case(Op::Create, ValidationError::new("priority", "must be one of low, medium, high"), "Error creating todo")]
    #[case(Op::Update, ValidationError::required("text"), "Error updating todo")]
    #[tokio::test]
    async fn validation_messages(#[case] op: Op, #[case] err: ValidationError, #[case] expected: &str) {
        let message = message_of(AppError::new(op, TodoError::Validation(err))).await;
        assert_eq!(message, expected);
    }
}
