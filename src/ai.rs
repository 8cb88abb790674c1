// AI provider client for the description API
//
// This module defines the seam to the external AI services and its
// OpenAI-compatible implementation. Three calls are exposed: image text
// extraction through the multimodal chat endpoint, plain text completion,
// and audio transcription.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use log::debug;
use reqwest::{multipart, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use crate::config::OpenAiConfig;

/// Fixed prompt sent with the image to the multimodal chat endpoint
const EXTRACTION_PROMPT: &str = "What's in this image?";

/// Output length bound for the image extraction step
const EXTRACTION_MAX_TOKENS: u32 = 300;

/// Output length bound for the description completion step
const COMPLETION_MAX_TOKENS: u32 = 150;

/// Sampling temperature for the description completion step
const COMPLETION_TEMPERATURE: f64 = 0.5;

/// Errors returned by the AI provider client
#[derive(Error, Debug)]
pub enum AiError {
    /// The HTTP request could not be sent or its body read
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The service answered with a non-success status
    #[error("service returned status {status}: {body}")]
    BadStatus { status: StatusCode, body: String },

    /// The service answered 2xx but the payload had an unexpected shape
    #[error("unexpected response shape: {0}")]
    MalformedResponse(String),
}

/// External AI services used by the pipelines
///
/// Implemented by [`OpenAiClient`] for production and by mocks in tests.
#[async_trait]
pub trait AiBackend: Send + Sync {
    /// Extract text from an image via the multimodal chat endpoint
    async fn extract_image_text(&self, image: &[u8], mime_type: &str) -> Result<String, AiError>;

    /// Run a plain text completion with fixed sampling parameters
    async fn complete(&self, prompt: &str) -> Result<String, AiError>;

    /// Transcribe an audio file via the speech-to-text endpoint
    async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String, AiError>;
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: String,
}

#[derive(Deserialize)]
struct TranscriptionApiResponse {
    text: String,
}

/// Client for an OpenAI-compatible API
pub struct OpenAiClient {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Read the body of a non-success response into a `BadStatus` error
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, AiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("unknown error"));
        Err(AiError::BadStatus { status, body })
    }
}

#[async_trait]
impl AiBackend for OpenAiClient {
    async fn extract_image_text(&self, image: &[u8], mime_type: &str) -> Result<String, AiError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let data_uri = format!(
            "data:{};base64,{}",
            mime_type,
            general_purpose::STANDARD.encode(image)
        );

        let body = serde_json::json!({
            "model": self.config.vision_model,
            "messages": [
                {
                    "role": "user",
                    "content": [
                        { "type": "text", "text": EXTRACTION_PROMPT },
                        { "type": "image_url", "image_url": { "url": data_uri } }
                    ]
                }
            ],
            "max_tokens": EXTRACTION_MAX_TOKENS
        });

        debug!(
            "Sending image ({} bytes) to vision model {}",
            image.len(),
            self.config.vision_model
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;
        let response = Self::check_status(response).await?;

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AiError::MalformedResponse(String::from("empty choices")))
    }

    async fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let url = format!("{}/completions", self.config.base_url);

        let body = serde_json::json!({
            "model": self.config.completion_model,
            "prompt": prompt,
            "max_tokens": COMPLETION_MAX_TOKENS,
            "temperature": COMPLETION_TEMPERATURE
        });

        debug!(
            "Sending completion prompt ({} chars) to model {}",
            prompt.len(),
            self.config.completion_model
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;
        let response = Self::check_status(response).await?;

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AiError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or_else(|| AiError::MalformedResponse(String::from("empty choices")))
    }

    async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String, AiError> {
        let url = format!("{}/audio/transcriptions", self.config.base_url);

        let file_part = multipart::Part::bytes(audio)
            .file_name(file_name.to_string())
            .mime_str("audio/mpeg")
            .map_err(|e| AiError::RequestFailed(format!("mime: {}", e)))?;

        let form = multipart::Form::new()
            .text("model", self.config.transcription_model.clone())
            .part("file", file_part);

        debug!(
            "Sending audio file {} to transcription model {}",
            file_name, self.config.transcription_model
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;
        let response = Self::check_status(response).await?;

        let parsed: TranscriptionApiResponse = response
            .json()
            .await
            .map_err(|e| AiError::MalformedResponse(e.to_string()))?;

        Ok(parsed.text)
    }
}
