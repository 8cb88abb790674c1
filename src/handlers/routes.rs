// API route handlers for the description API
//
// This module contains the route handlers for the three endpoints. Each
// upload handler runs a strictly linear pipeline: receive the file, check
// the allow-list, invoke the AI calls, emit the JSON payload. The scratch
// folder guard drops when the handler returns, on every path.

use actix_web::{post, web, HttpResponse};
use actix_multipart::Multipart;
use log::info;

use crate::ai::AiBackend;
use crate::config::HandlerConfig;
use crate::error::HandlerError;
use crate::handlers::authentication::AllowList;
use crate::handlers::form::{extract_upload, UploadKind};
use crate::models::{AuthRequest, AuthResponse, DescriptionResponse, TranscriptionResponse};
use crate::pipeline;
use crate::transcode::AudioNormalizer;

/// Handler for image description requests
///
/// This endpoint receives a product image, extracts its text through the
/// vision endpoint, and generates a title/description/price suggestion
/// through the completion endpoint.
#[post("/describe")]
pub async fn describe(
    form: Multipart,
    config: web::Data<HandlerConfig>,
    allow_list: web::Data<AllowList>,
    ai: web::Data<dyn AiBackend>,
) -> Result<HttpResponse, HandlerError> {
    let upload = extract_upload(form, &config, UploadKind::Image).await?;

    // Cost-control invariant: no paid call before the allow-list check
    allow_list.authorize(upload.email.as_deref())?;

    info!("Processing image upload {}", upload.paths.id);
    let description = pipeline::describe_image(ai.get_ref(), &upload.paths.file).await?;

    Ok(HttpResponse::Ok().json(DescriptionResponse { description }))
}

/// Handler for audio transcription requests
///
/// This endpoint receives an audio file, normalizes it with the external
/// transcoder, and streams the result to the speech-to-text endpoint.
#[post("/analyze-audio")]
pub async fn analyze_audio(
    form: Multipart,
    config: web::Data<HandlerConfig>,
    allow_list: web::Data<AllowList>,
    ai: web::Data<dyn AiBackend>,
    normalizer: web::Data<AudioNormalizer>,
) -> Result<HttpResponse, HandlerError> {
    let upload = extract_upload(form, &config, UploadKind::Audio).await?;

    // Cost-control invariant: no paid call before the allow-list check
    allow_list.authorize(upload.email.as_deref())?;

    info!("Processing audio upload {}", upload.paths.id);
    let transcribed_text =
        pipeline::transcribe_audio(ai.get_ref(), &normalizer, &upload.paths.file).await?;

    Ok(HttpResponse::Ok().json(TranscriptionResponse { transcribed_text }))
}

/// Handler for direct allow-list checks
///
/// Lets clients verify an identity before uploading anything.
#[post("/authenticate")]
pub async fn authenticate(
    body: web::Json<AuthRequest>,
    allow_list: web::Data<AllowList>,
) -> HttpResponse {
    if allow_list.is_authorized(Some(&body.email)) {
        HttpResponse::Ok().json(AuthResponse {
            message: String::from("Authorized"),
        })
    } else {
        HttpResponse::Unauthorized().json(AuthResponse {
            message: String::from("Unauthorized"),
        })
    }
}
