// Error handling for the description API
//
// This module defines error types and handling for the API handlers.
// It centralizes error definitions and the mapping to HTTP responses.

use std::io;
use thiserror::Error;

use actix_web::{HttpResponse, ResponseError};

use crate::models::ErrorResponse;

/// Errors that can occur in the API handlers
///
/// Pipeline failures (`ConversionFailed`, `DescriptionFailed`,
/// `TranscriptionFailed`) carry fixed messages only: the upstream error
/// detail is logged at the point of failure and never returned to the client.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Error when processing multipart form data
    #[error("Form error: {0}")]
    FormError(String),

    /// Error when saving file data
    #[error("File error: {0}")]
    FileError(#[from] io::Error),

    /// Error when no image file was provided
    #[error("No image file uploaded")]
    NoImageFile,

    /// Error when no audio file was provided
    #[error("No audio file uploaded")]
    NoAudioFile,

    /// Error when a file is too large
    #[error("File too large: {0} bytes exceeds limit of {1} bytes")]
    FileTooLarge(usize, usize),

    /// Error when the caller identity is not on the allow-list
    #[error("Unauthorized")]
    Unauthorized,

    /// Error when the audio transcoder fails
    #[error("Failed to convert audio file")]
    ConversionFailed,

    /// Error when the image description pipeline fails
    #[error("Failed to describe image")]
    DescriptionFailed,

    /// Error when the audio transcription pipeline fails
    #[error("Failed to transcribe audio")]
    TranscriptionFailed,
}

impl HandlerError {
    /// Create a new FormError
    pub fn form_error<S: Into<String>>(msg: S) -> Self {
        Self::FormError(msg.into())
    }
}

impl ResponseError for HandlerError {
    fn error_response(&self) -> HttpResponse {
        let error_response = ErrorResponse {
            error: self.to_string(),
        };

        match self {
            HandlerError::NoImageFile
            | HandlerError::NoAudioFile
            | HandlerError::FormError(_) => HttpResponse::BadRequest().json(error_response),
            HandlerError::Unauthorized => HttpResponse::Unauthorized().json(error_response),
            HandlerError::FileTooLarge(_, _) => {
                HttpResponse::PayloadTooLarge().json(error_response)
            }
            _ => HttpResponse::InternalServerError().json(error_response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn missing_files_map_to_bad_request() {
        assert_eq!(
            HandlerError::NoImageFile.error_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HandlerError::NoAudioFile.error_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn unauthorized_maps_to_401() {
        assert_eq!(
            HandlerError::Unauthorized.error_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn pipeline_failures_map_to_500_with_fixed_messages() {
        for err in [
            HandlerError::ConversionFailed,
            HandlerError::DescriptionFailed,
            HandlerError::TranscriptionFailed,
        ] {
            assert_eq!(
                err.error_response().status(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
            // Fixed messages, no upstream detail
            assert!(!err.to_string().contains(':'));
        }
    }
}
