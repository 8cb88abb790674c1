// Description API Library
//
// This crate provides an HTTP API that accepts uploaded images or audio
// files, forwards them to external AI services, and returns generated text:
// a product description for images, a transcription for audio.

pub mod ai;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod file_utils;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod transcode;

// Re-export common types for easier access
pub use ai::{AiBackend, AiError, OpenAiClient};
pub use config::{HandlerConfig, OpenAiConfig, TranscodeConfig};
pub use error::HandlerError;
pub use handlers::{analyze_audio, authenticate, describe, AllowList};
pub use models::{DescriptionResponse, ErrorResponse, TranscriptionResponse};
pub use transcode::AudioNormalizer;
