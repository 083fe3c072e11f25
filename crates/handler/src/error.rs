use crate::response::message_response;
use aws_lambda_events::apigw::ApiGatewayProxyResponse;
use http::StatusCode;
use lambda_runtime::tracing;
use std::any::Any;
use std::fmt::{Display, Formatter};
use store::StoreError;

pub const INVALID_JSON: &str = "Invalid JSON in request body";
pub const RECORD_NOT_FOUND: &str = "Student record not found";
pub const STORE_FAILURE: &str = "Error interacting with the data store";
pub const INTERNAL_ERROR: &str = "Internal Server Error";

/// Failures while handling a single request.
/// Every variant maps to exactly one response, see `into_response`.
#[derive(Debug)]
pub enum HandlerError {
    // A required field or parameter was missing, carries the response message
    Validation(&'static str),
    // The request body wasn't valid JSON for a student
    Parse(serde_json::Error),
    // The record to delete or update doesn't exist
    NotFound(String),
    Store(StoreError),
    Internal(String),
}

impl HandlerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::Validation(_) | HandlerError::Parse(_) => StatusCode::BAD_REQUEST,
            HandlerError::NotFound(_) => StatusCode::NOT_FOUND,
            HandlerError::Store(_) | HandlerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message returned to the caller, which never includes internal detail.
    pub fn message(&self) -> &'static str {
        match self {
            HandlerError::Validation(message) => *message,
            HandlerError::Parse(_) => INVALID_JSON,
            HandlerError::NotFound(_) => RECORD_NOT_FOUND,
            HandlerError::Store(_) => STORE_FAILURE,
            HandlerError::Internal(_) => INTERNAL_ERROR,
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            HandlerError::Validation(_) => "validation",
            HandlerError::Parse(_) => "parse",
            HandlerError::NotFound(_) => "not_found",
            HandlerError::Store(_) => "store",
            HandlerError::Internal(_) => "internal",
        }
    }

    pub(crate) fn from_panic(panic: Box<dyn Any + Send>) -> Self {
        let message: String = if let Some(message) = panic.downcast_ref::<&str>() {
            message.to_string()
        } else if let Some(message) = panic.downcast_ref::<String>() {
            message.clone()
        } else {
            "unknown panic".to_string()
        };

        HandlerError::Internal(format!("panicked: {message}"))
    }

    pub(crate) fn log(&self) {
        if self.status_code().is_server_error() {
            tracing::error!(category = self.category(), "{}", self);
        } else {
            tracing::warn!(category = self.category(), "{}", self);
        }
    }

    pub fn into_response(self) -> ApiGatewayProxyResponse {
        message_response(self.status_code(), self.message())
    }
}

impl From<StoreError> for HandlerError {
    fn from(err: StoreError) -> Self {
        if err.is_missing_entry() {
            HandlerError::NotFound(err.student_id)
        } else {
            HandlerError::Store(err)
        }
    }
}

impl Display for HandlerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerError::Validation(message) => f.write_str(message),
            HandlerError::Parse(err) => write!(f, "{INVALID_JSON}: {err}"),
            HandlerError::NotFound(student_id) => write!(f, "No student record for {student_id}"),
            HandlerError::Store(err) => write!(f, "{err}"),
            HandlerError::Internal(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HandlerError::Parse(err) => Some(err),
            HandlerError::Store(err) => Some(err),
            _ => None,
        }
    }
}
