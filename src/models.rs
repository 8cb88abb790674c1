// Description API data models
//
// This module contains the data models used for the API.
// It includes request and response types used across the endpoints.

use serde::{Deserialize, Serialize};

/// Response for image description requests
#[derive(Debug, Serialize, Deserialize)]
pub struct DescriptionResponse {
    /// Generated product description
    pub description: String,
}

/// Response for audio transcription requests
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    /// Transcribed text returned by the speech-to-text service
    #[serde(rename = "transcribedText")]
    pub transcribed_text: String,
}

/// Error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Request body for the authentication endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthRequest {
    /// Caller identity to check against the allow-list
    pub email: String,
}

/// Response body for the authentication endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// "Authorized" or "Unauthorized"
    pub message: String,
}
