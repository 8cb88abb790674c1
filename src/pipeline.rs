// AI pipelines for the description API
//
// This module chains the external AI calls for the two endpoints. Each
// stage either produces the next stage's input or short-circuits with a
// tagged failure; upstream detail is logged here and never surfaces in
// the response.

use log::{error, info};
use std::path::Path;

use crate::ai::AiBackend;
use crate::error::HandlerError;
use crate::transcode::AudioNormalizer;

/// Guess the image MIME type from the stored file extension
fn image_mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "image/png",
    }
}

/// Build the generation prompt around the text extracted from the image
fn description_prompt(extracted_text: &str) -> String {
    format!(
        "Analise o seguinte texto extraído de uma imagem: {}. Baseado no conteúdo, \
         forneça um título adequado para o objeto identificado, descrição do produto \
         e sugira um preço de mercado para o mesmo.",
        extracted_text
    )
}

/// Image pipeline: extract text from the image, then generate a product
/// description around it
///
/// Both calls go to paid endpoints; a failure at either step aborts the
/// whole pipeline with `DescriptionFailed` and no partial result.
pub async fn describe_image(
    ai: &dyn AiBackend,
    image_path: &Path,
) -> Result<String, HandlerError> {
    let image = tokio::fs::read(image_path).await?;

    let extracted = ai
        .extract_image_text(&image, image_mime_type(image_path))
        .await
        .map_err(|e| {
            error!("Image text extraction failed: {}", e);
            HandlerError::DescriptionFailed
        })?;

    let completion = ai
        .complete(&description_prompt(&extracted))
        .await
        .map_err(|e| {
            error!("Description completion failed: {}", e);
            HandlerError::DescriptionFailed
        })?;

    let description = completion.trim().to_string();
    info!("Generated description ({} chars)", description.len());
    Ok(description)
}

/// Audio pipeline: normalize the upload, then send it to the
/// speech-to-text endpoint
///
/// The normalized file is owned by a scoped guard, so it is deleted when
/// this function returns, whether transcription succeeded or failed.
pub async fn transcribe_audio(
    ai: &dyn AiBackend,
    normalizer: &AudioNormalizer,
    audio_path: &Path,
) -> Result<String, HandlerError> {
    let normalized = normalizer.normalize(audio_path).await.map_err(|e| {
        error!("Audio conversion failed: {}", e);
        HandlerError::ConversionFailed
    })?;

    let audio = tokio::fs::read(normalized.path()).await?;

    let transcript = ai
        .transcribe(audio, normalized.file_name())
        .await
        .map_err(|e| {
            error!("Transcription failed: {}", e);
            HandlerError::TranscriptionFailed
        })?;

    info!("Transcribed audio ({} chars)", transcript.len());
    Ok(transcript)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiError;
    use crate::config::TranscodeConfig;
    use crate::file_utils::{cleanup_folder, save_file_data};
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Records the calls made against it and returns canned outputs
    struct MockAi {
        extracted: &'static str,
        completion: &'static str,
        fail_extraction: bool,
        complete_calls: AtomicUsize,
        transcribe_calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl MockAi {
        fn new(extracted: &'static str, completion: &'static str) -> Self {
            Self {
                extracted,
                completion,
                fail_extraction: false,
                complete_calls: AtomicUsize::new(0),
                transcribe_calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn failing_extraction() -> Self {
            Self {
                fail_extraction: true,
                ..Self::new("", "")
            }
        }
    }

    #[async_trait]
    impl AiBackend for MockAi {
        async fn extract_image_text(
            &self,
            _image: &[u8],
            _mime_type: &str,
        ) -> Result<String, AiError> {
            if self.fail_extraction {
                return Err(AiError::RequestFailed(String::from("boom")));
            }
            Ok(self.extracted.to_string())
        }

        async fn complete(&self, prompt: &str) -> Result<String, AiError> {
            self.complete_calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.completion.to_string())
        }

        async fn transcribe(&self, _audio: Vec<u8>, _file_name: &str) -> Result<String, AiError> {
            self.transcribe_calls.fetch_add(1, Ordering::SeqCst);
            Ok(String::from("unused"))
        }
    }

    fn scratch_file(name: &str) -> PathBuf {
        let folder = std::env::temp_dir().join(format!("describe_api_test_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&folder).unwrap();
        let file = folder.join(name);
        save_file_data(b"bytes", &file).unwrap();
        file
    }

    #[tokio::test]
    async fn description_embeds_extracted_text_and_trims_completion() {
        let image = scratch_file("image.png");
        let ai = MockAi::new("vintage enamel mug", "  A charming mug.  ");

        let description = describe_image(&ai, &image).await.unwrap();

        assert_eq!(description, "A charming mug.");
        let prompts = ai.prompts.lock().unwrap();
        assert!(prompts[0].contains("vintage enamel mug"));
        cleanup_folder(image.parent().unwrap());
    }

    #[tokio::test]
    async fn extraction_failure_aborts_before_completion_call() {
        let image = scratch_file("image.png");
        let ai = MockAi::failing_extraction();

        let err = describe_image(&ai, &image).await.unwrap_err();

        assert!(matches!(err, HandlerError::DescriptionFailed));
        assert_eq!(ai.complete_calls.load(Ordering::SeqCst), 0);
        cleanup_folder(image.parent().unwrap());
    }

    #[tokio::test]
    async fn conversion_failure_skips_transcription() {
        let audio = scratch_file("audio.ogg");
        let ai = MockAi::new("", "");
        let normalizer = AudioNormalizer::new(&TranscodeConfig {
            command_path: String::from("false"),
            target_format: String::from("mp3"),
        });

        let err = transcribe_audio(&ai, &normalizer, &audio).await.unwrap_err();

        assert!(matches!(err, HandlerError::ConversionFailed));
        assert_eq!(ai.transcribe_calls.load(Ordering::SeqCst), 0);
        cleanup_folder(audio.parent().unwrap());
    }

    #[test]
    fn mime_type_follows_stored_extension() {
        assert_eq!(image_mime_type(Path::new("a/img.jpeg")), "image/jpeg");
        assert_eq!(image_mime_type(Path::new("a/img.webp")), "image/webp");
        assert_eq!(image_mime_type(Path::new("a/img.bin")), "image/png");
    }
}
