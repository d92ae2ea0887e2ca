use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ErrorDetail, ErrorResponse};
use crate::services::converter::ConverterError;

pub type AppResult<T> = Result<T, AppError>;

/// Message returned for converter failures that match no known signature.
pub const GENERIC_CONVERSION_FAILURE: &str =
    "The document could not be converted. Please try again or use a different file.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing file in request")]
    MissingFile,

    #[error("Invalid file type: {message}")]
    InvalidFileType { message: String },

    #[error("Uploaded file is empty")]
    EmptyFile,

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("File size too large. Maximum {limit_mb}MB allowed.")]
    FileTooLarge { limit_mb: usize },

    #[error("PDF appears to be password protected. Please provide an unlocked PDF.")]
    PasswordProtected,

    #[error("PDF file appears to be corrupted or invalid.")]
    CorruptedInput,

    #[error("Conversion failed: {message}")]
    ConversionFailure { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingFile => "MISSING_FILE",
            AppError::InvalidFileType { .. } => "INVALID_FILE_TYPE",
            AppError::EmptyFile => "EMPTY_FILE",
            AppError::InvalidRequest { .. } => "INVALID_REQUEST",
            AppError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            AppError::PasswordProtected => "PASSWORD_PROTECTED",
            AppError::CorruptedInput => "CORRUPTED_INPUT",
            AppError::ConversionFailure { .. } => "CONVERSION_FAILED",
            AppError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingFile => StatusCode::BAD_REQUEST,
            AppError::InvalidFileType { .. } => StatusCode::BAD_REQUEST,
            AppError::EmptyFile => StatusCode::BAD_REQUEST,
            AppError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::PasswordProtected => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::CorruptedInput => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ConversionFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl AppError {
    /// Renders the error envelope under the id already assigned to the request.
    pub fn into_response_with_id(self, request_id: &str) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(
                error_code = error_code,
                status_code = %status,
                request_id = %request_id,
                error_message = %message,
                "API error occurred"
            );
        } else {
            tracing::warn!(
                error_code = error_code,
                status_code = %status,
                request_id = %request_id,
                error_message = %message,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: error_code.to_string(),
                message,
                request_id: request_id.to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
            data: None,
        };

        (status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.into_response_with_id(&Uuid::new_v4().to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: format!("IO error: {}", err),
        }
    }
}

// The converter's own diagnostic never reaches the caller; it is logged where
// the failure is observed.
impl From<ConverterError> for AppError {
    fn from(err: ConverterError) -> Self {
        match err {
            ConverterError::PasswordProtected(_) => AppError::PasswordProtected,
            ConverterError::Corrupted(_) => AppError::CorruptedInput,
            ConverterError::Failed(_) => AppError::conversion(GENERIC_CONVERSION_FAILURE),
        }
    }
}

impl AppError {
    pub fn invalid_file_type(message: impl Into<String>) -> Self {
        AppError::InvalidFileType {
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        AppError::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        AppError::ConversionFailure {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }
}
