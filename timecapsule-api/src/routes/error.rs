use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    OverlapConflict,
    ReceiptNotUploaded,
    UploadInFlight,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<ErrorCode>,
}

use crate::{
    domain::{AttachmentFlowError, EntryValidationError},
    repositories::RepositoryError,
    services::StorageError,
};

pub struct ApiError {
    status: StatusCode,
    message: String,
    code: Option<ErrorCode>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DatabaseError(ref e) => {
                tracing::error!("Database error: {:?}", e);
                Self::internal(err.to_string())
            }
            RepositoryError::NotFound(_) => Self::not_found(err.to_string()),
        }
    }
}

impl From<EntryValidationError> for ApiError {
    fn from(err: EntryValidationError) -> Self {
        match err {
            EntryValidationError::InvalidRange | EntryValidationError::TooShort => {
                Self::bad_request(err.to_string())
            }
            // Reported to the caller, never fatal: the client re-renders the form.
            EntryValidationError::OverlapConflict => {
                Self::conflict(err.to_string()).with_code(ErrorCode::OverlapConflict)
            }
        }
    }
}

impl From<AttachmentFlowError> for ApiError {
    fn from(err: AttachmentFlowError) -> Self {
        match err {
            AttachmentFlowError::UploadInFlight => {
                Self::conflict(err.to_string()).with_code(ErrorCode::UploadInFlight)
            }
            AttachmentFlowError::NothingUploaded => {
                Self::conflict(err.to_string()).with_code(ErrorCode::ReceiptNotUploaded)
            }
            AttachmentFlowError::AlreadyUploaded
            | AttachmentFlowError::NotUploading
            | AttachmentFlowError::NotSubmitted => Self::conflict(err.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => Self::not_found(err.to_string()),
            StorageError::InvalidKey(_) => Self::bad_request(err.to_string()),
            StorageError::InvalidToken => Self::forbidden(err.to_string()),
            StorageError::IoError(_) | StorageError::MetadataError(_) | StorageError::SigningError(_) => {
                tracing::error!("Object store error: {:?}", err);
                Self::internal("object store operation failed")
            }
        }
    }
}
