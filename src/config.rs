// Description API configuration
//
// This module contains configuration structures and constants for the API.
// It centralizes all configuration parameters and provides defaults from
// environment variables.

use std::env;
use std::path::PathBuf;

/// Default values for configuration
pub mod defaults {
    // Directory for transient upload storage
    pub const UPLOAD_DIR: &str = "./uploads";

    // Maximum accepted upload size (32MB)
    pub const MAX_FILE_SIZE: usize = 33554432;

    // External transcoder command
    pub const FFMPEG_CMD: &str = "ffmpeg";

    // Target container for normalized audio
    pub const AUDIO_TARGET_FORMAT: &str = "mp3";

    // OpenAI-compatible API base URL
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

    // Model used for the text-completion step
    pub const COMPLETION_MODEL: &str = "gpt-3.5-turbo-instruct";

    // Model used for image text extraction
    pub const VISION_MODEL: &str = "gpt-4o-mini";

    // Model used for audio transcription
    pub const TRANSCRIPTION_MODEL: &str = "whisper-1";
}

/// Configuration for the API handlers
#[derive(Clone, Debug)]
pub struct HandlerConfig {
    /// Directory to store transient uploads
    pub upload_dir: String,
    /// Maximum accepted upload size in bytes
    pub max_file_size: usize,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| String::from(defaults::UPLOAD_DIR)),
            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::MAX_FILE_SIZE),
        }
    }
}

impl HandlerConfig {
    /// Ensures the upload directory exists
    pub fn ensure_upload_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.upload_dir)
    }
}

/// Configuration for the OpenAI-compatible AI provider
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    /// API key sent as a bearer token
    pub api_key: String,
    /// Base URL of the provider (no trailing slash)
    pub base_url: String,
    /// Model for the text-completion step
    pub completion_model: String,
    /// Model for image text extraction
    pub vision_model: String,
    /// Model for audio transcription
    pub transcription_model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            base_url: env::var("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| String::from(defaults::OPENAI_BASE_URL)),
            completion_model: env::var("OPENAI_COMPLETION_MODEL")
                .unwrap_or_else(|_| String::from(defaults::COMPLETION_MODEL)),
            vision_model: env::var("OPENAI_VISION_MODEL")
                .unwrap_or_else(|_| String::from(defaults::VISION_MODEL)),
            transcription_model: env::var("OPENAI_TRANSCRIPTION_MODEL")
                .unwrap_or_else(|_| String::from(defaults::TRANSCRIPTION_MODEL)),
        }
    }
}

/// Configuration for the audio transcoder
#[derive(Clone, Debug)]
pub struct TranscodeConfig {
    /// Path to the transcoder command
    pub command_path: String,
    /// Target container/codec extension for normalized audio
    pub target_format: String,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            command_path: env::var("FFMPEG_CMD")
                .unwrap_or_else(|_| String::from(defaults::FFMPEG_CMD)),
            target_format: env::var("AUDIO_TARGET_FORMAT")
                .unwrap_or_else(|_| String::from(defaults::AUDIO_TARGET_FORMAT)),
        }
    }
}

/// Represents the paths of a single upload
#[derive(Debug, Clone)]
pub struct UploadPaths {
    /// Unique scratch folder for this upload
    pub folder: PathBuf,
    /// Absolute path of the uploaded file
    pub file: PathBuf,
    /// Upload ID (UUID)
    pub id: String,
}
