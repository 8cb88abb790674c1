// Form data processing for the description API
//
// This module handles the extraction of multipart form data for the upload
// endpoints: exactly one file under the expected field name, plus an
// optional caller identity. The scratch folder created for the file is
// owned by a guard so it is removed on every exit path.

use actix_multipart::Multipart;
use futures::{StreamExt, TryStreamExt};
use log::{error, info};

use crate::config::{HandlerConfig, UploadPaths};
use crate::error::HandlerError;
use crate::file_utils::{
    generate_unique_upload_paths, sanitize_extension, save_file_data, ScratchGuard,
};

/// Which upload endpoint the form belongs to
#[derive(Clone, Copy, Debug)]
pub enum UploadKind {
    Image,
    Audio,
}

impl UploadKind {
    /// Multipart field name carrying the file
    fn field_name(&self) -> &'static str {
        match self {
            UploadKind::Image => "image",
            UploadKind::Audio => "audio",
        }
    }

    /// Error for a form that never carried the file field
    fn missing_error(&self) -> HandlerError {
        match self {
            UploadKind::Image => HandlerError::NoImageFile,
            UploadKind::Audio => HandlerError::NoAudioFile,
        }
    }
}

/// Extracted upload: stored file, its owning scratch guard, and the
/// optional caller identity
pub struct UploadForm {
    pub paths: UploadPaths,
    pub scratch: ScratchGuard,
    pub email: Option<String>,
}

/// Extract and process multipart form data for the upload endpoints
///
/// # Arguments
///
/// * `form` - The multipart form from the HTTP request
/// * `config` - Handler configuration
/// * `kind` - Which file field is expected
///
/// # Returns
///
/// * `Result<UploadForm, HandlerError>` - The stored upload, or an error
pub async fn extract_upload(
    mut form: Multipart,
    config: &HandlerConfig,
    kind: UploadKind,
) -> Result<UploadForm, HandlerError> {
    let mut email: Option<String> = None;
    let mut upload: Option<(UploadPaths, ScratchGuard)> = None;

    // Ensure the upload directory exists
    config.ensure_upload_dir().map_err(|e| {
        error!("Failed to create upload directory: {}", e);
        HandlerError::FileError(e)
    })?;

    // Process form data
    while let Ok(Some(mut field)) = form.try_next().await {
        let content_disposition = field.content_disposition();
        let field_name = content_disposition
            .and_then(|cd| cd.get_name().map(|name| name.to_string()))
            .unwrap_or_default();
        let file_name = content_disposition
            .and_then(|cd| cd.get_filename().map(|name| name.to_string()))
            .unwrap_or_default();

        if field_name == "email" {
            // Read text parameter
            let mut value = String::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| {
                    HandlerError::form_error(format!("Error reading email field: {}", e))
                })?;
                if let Ok(s) = std::str::from_utf8(&chunk) {
                    value.push_str(s);
                }
            }

            let value = value.trim().to_string();
            if !value.is_empty() {
                email = Some(value);
            }
        } else if field_name == kind.field_name() {
            // Generate a unique scratch folder and filename for the upload
            let extension = sanitize_extension(&file_name);
            let paths = generate_unique_upload_paths(
                &config.upload_dir,
                kind.field_name(),
                &extension,
            )
            .map_err(|e| {
                error!("Failed to create unique upload directory: {}", e);
                HandlerError::FileError(e)
            })?;

            // The guard owns the folder from here on; any early return
            // below drops it and removes the folder
            let scratch = ScratchGuard::new(paths.folder.clone());

            // Process the file data
            let mut total_size = 0;
            let mut file_data = Vec::new();

            while let Some(chunk) = field.next().await {
                let data = chunk.map_err(|e| {
                    HandlerError::form_error(format!("Error processing file upload: {}", e))
                })?;

                total_size += data.len();
                if total_size > config.max_file_size {
                    return Err(HandlerError::FileTooLarge(total_size, config.max_file_size));
                }

                file_data.extend_from_slice(&data);
            }

            save_file_data(&file_data, &paths.file)?;
            info!("Saved upload {}: {}", paths.id, paths.file.display());

            upload = Some((paths, scratch));
        } else {
            // Skip unknown fields
            while field.next().await.is_some() {}
        }
    }

    // Ensure the file field was present
    let (paths, scratch) = upload.ok_or_else(|| kind.missing_error())?;

    Ok(UploadForm {
        paths,
        scratch,
        email,
    })
}
