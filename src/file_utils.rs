// File utilities for the description API
//
// This module contains utility functions for transient upload storage.
// It handles creating unique scratch folders, saving uploaded bytes, and
// guaranteed cleanup through a scoped guard.

use log::{debug, error};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::UploadPaths;

/// Generate a unique upload path with a UUID scratch folder
///
/// The folder is created under `base_dir` and the returned file path is
/// absolute, so downstream process invocations are unambiguous.
///
/// # Errors
///
/// Returns an IO error if directory creation fails
pub fn generate_unique_upload_paths(
    base_dir: &str,
    prefix: &str,
    extension: &str,
) -> io::Result<UploadPaths> {
    let uuid = Uuid::new_v4();
    let id = uuid.to_string();
    let filename = format!("{}_{}.{}", prefix, uuid, extension);

    let folder = Path::new(base_dir).join(&id);
    fs::create_dir_all(&folder)?;

    // Canonicalize after creation so the file path handed to external
    // processes is absolute
    let folder = folder.canonicalize()?;
    let file = folder.join(&filename);

    Ok(UploadPaths { folder, file, id })
}

/// Save uploaded file data to the filesystem
pub fn save_file_data(data: &[u8], file_path: &Path) -> io::Result<()> {
    let mut file = File::create(file_path)?;
    file.write_all(data)?;
    Ok(())
}

/// Clean up a folder and its contents
///
/// This function logs errors but doesn't return them to the caller
pub fn cleanup_folder(folder_path: &Path) {
    if let Err(e) = fs::remove_dir_all(folder_path) {
        error!("Failed to clean up folder {}: {}", folder_path.display(), e);
    } else {
        debug!("Cleaned up folder: {}", folder_path.display());
    }
}

/// Scoped owner of an upload scratch folder
///
/// The folder is removed when the guard drops, on success and failure
/// paths alike. No upload outlives the request that created it.
#[derive(Debug)]
pub struct ScratchGuard {
    folder: PathBuf,
}

impl ScratchGuard {
    pub fn new(folder: PathBuf) -> Self {
        Self { folder }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        cleanup_folder(&self.folder);
    }
}

/// Extract a safe file extension from a client-supplied file name
///
/// Only alphanumeric extensions pass through, so path separators and shell
/// metacharacters never reach the filesystem or the transcoder command line.
pub fn sanitize_extension(file_name: &str) -> String {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    if !extension.is_empty() && extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        extension.to_ascii_lowercase()
    } else {
        String::from("bin")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn test_base_dir() -> String {
        let dir = env::temp_dir().join(format!("describe_api_test_{}", Uuid::new_v4()));
        dir.to_str().unwrap().to_string()
    }

    #[test]
    fn upload_paths_are_unique_and_absolute() {
        let base = test_base_dir();
        let a = generate_unique_upload_paths(&base, "image", "png").unwrap();
        let b = generate_unique_upload_paths(&base, "image", "png").unwrap();

        assert_ne!(a.folder, b.folder);
        assert!(a.file.is_absolute());
        assert!(a.folder.is_dir());

        cleanup_folder(Path::new(&base));
    }

    #[test]
    fn scratch_guard_removes_folder_on_drop() {
        let base = test_base_dir();
        let paths = generate_unique_upload_paths(&base, "audio", "wav").unwrap();
        save_file_data(b"data", &paths.file).unwrap();

        {
            let _guard = ScratchGuard::new(paths.folder.clone());
            assert!(paths.file.exists());
        }

        assert!(!paths.folder.exists());
        cleanup_folder(Path::new(&base));
    }

    #[test]
    fn sanitize_extension_accepts_plain_extensions() {
        assert_eq!(sanitize_extension("photo.PNG"), "png");
        assert_eq!(sanitize_extension("clip.ogg"), "ogg");
    }

    #[test]
    fn sanitize_extension_rejects_suspicious_names() {
        assert_eq!(sanitize_extension("noext"), "bin");
        assert_eq!(sanitize_extension("evil.sh;rm"), "bin");
        assert_eq!(sanitize_extension("weird.m p3"), "bin");
        assert_eq!(sanitize_extension("trailingdot."), "bin");
    }
}
