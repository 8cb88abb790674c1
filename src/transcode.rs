// Audio format normalization for the description API
//
// This module converts uploaded audio into the container/codec accepted by
// the transcription service by invoking the external transcoder. The
// command is built as an argument vector, never a shell string, and input
// paths with traversal components are rejected before the process spawns.

use log::{debug, error};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::process::ExitStatus;
use thiserror::Error;
use tokio::process::Command;

use crate::config::TranscodeConfig;

/// Errors returned by the audio normalizer
#[derive(Error, Debug)]
pub enum TranscodeError {
    /// The input path contains traversal components
    #[error("unsafe input path: {0}")]
    UnsafePath(String),

    /// The transcoder process could not be spawned
    #[error("failed to run transcoder: {0}")]
    Spawn(#[from] io::Error),

    /// The transcoder ran but exited non-zero
    #[error("transcoder exited with {status}: {stderr}")]
    CommandFailed { status: ExitStatus, stderr: String },

    /// The transcoder exited zero but the output file is missing
    #[error("transcoder produced no output file: {0}")]
    MissingOutput(String),
}

/// Normalized audio artifact owned by the request that created it
///
/// The file is removed when this guard drops, whether the transcription
/// call afterwards succeeded or failed.
#[derive(Debug)]
pub struct NormalizedAudio {
    path: PathBuf,
}

impl NormalizedAudio {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name to present to the transcription service
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("audio")
    }
}

impl Drop for NormalizedAudio {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            error!(
                "Failed to remove normalized audio {}: {}",
                self.path.display(),
                e
            );
        } else {
            debug!("Removed normalized audio: {}", self.path.display());
        }
    }
}

/// Audio normalizer backed by an external transcoder process
#[derive(Clone, Debug)]
pub struct AudioNormalizer {
    command_path: String,
    target_format: String,
}

impl AudioNormalizer {
    pub fn new(config: &TranscodeConfig) -> Self {
        Self {
            command_path: config.command_path.clone(),
            target_format: config.target_format.clone(),
        }
    }

    /// Derive the output path for a given input
    ///
    /// The inserted `normalized` segment guarantees the output never
    /// collides with the input, whatever extension the upload carried.
    fn output_path(&self, input: &Path) -> PathBuf {
        input.with_extension(format!("normalized.{}", self.target_format))
    }

    /// Reject paths with traversal components before they reach the command line
    fn validate_input(input: &Path) -> Result<(), TranscodeError> {
        if input
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(TranscodeError::UnsafePath(input.display().to_string()));
        }
        if input.file_name().is_none() {
            return Err(TranscodeError::UnsafePath(input.display().to_string()));
        }
        Ok(())
    }

    /// Re-encode `input` into the target format, waiting for completion
    ///
    /// The returned guard owns the new file; the caller keeps it alive for
    /// the duration of the transcription call and no longer.
    pub async fn normalize(&self, input: &Path) -> Result<NormalizedAudio, TranscodeError> {
        Self::validate_input(input)?;

        let output = self.output_path(input);
        debug!(
            "Transcoding {} -> {}",
            input.display(),
            output.display()
        );

        let result = Command::new(&self.command_path)
            .arg("-i")
            .arg(input)
            .args(["-vn", "-ar", "44100", "-ac", "2", "-b:a", "192k", "-y"])
            .arg(&output)
            .output()
            .await?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            return Err(TranscodeError::CommandFailed {
                status: result.status,
                stderr,
            });
        }

        if !output.is_file() {
            return Err(TranscodeError::MissingOutput(output.display().to_string()));
        }

        Ok(NormalizedAudio { path: output })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_utils::{cleanup_folder, save_file_data};
    use std::env;
    use uuid::Uuid;

    fn normalizer(command: &str) -> AudioNormalizer {
        AudioNormalizer::new(&TranscodeConfig {
            command_path: command.to_string(),
            target_format: String::from("mp3"),
        })
    }

    fn scratch_file(name: &str) -> PathBuf {
        let folder = env::temp_dir().join(format!("describe_api_test_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&folder).unwrap();
        let file = folder.join(name);
        save_file_data(b"not really audio", &file).unwrap();
        file
    }

    #[test]
    fn output_path_never_collides_with_input() {
        let n = normalizer("ffmpeg");
        let output = n.output_path(Path::new("/tmp/up/audio_1.mp3"));
        assert_eq!(output, Path::new("/tmp/up/audio_1.normalized.mp3"));
    }

    #[tokio::test]
    async fn traversal_paths_are_rejected_without_spawning() {
        // A command that cannot exist proves validation runs first
        let n = normalizer("/nonexistent/transcoder");
        let err = n
            .normalize(Path::new("../../etc/passwd"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::UnsafePath(_)));
    }

    #[tokio::test]
    async fn nonzero_exit_maps_to_command_failed() {
        let input = scratch_file("audio.ogg");
        let err = normalizer("false").normalize(&input).await.unwrap_err();
        assert!(matches!(err, TranscodeError::CommandFailed { .. }));
        cleanup_folder(input.parent().unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_transcode_is_removed_on_drop() {
        use std::os::unix::fs::PermissionsExt;

        let input = scratch_file("audio.ogg");
        let folder = input.parent().unwrap().to_path_buf();

        // Stand-in transcoder: copies the input ($2) to the last argument
        let script = folder.join("fake_ffmpeg.sh");
        save_file_data(b"#!/bin/sh\nfor last; do :; done\ncp \"$2\" \"$last\"\n", &script)
            .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let n = normalizer(script.to_str().unwrap());
        let output_path = {
            let normalized = n.normalize(&input).await.unwrap();
            assert!(normalized.path().is_file());
            normalized.path().to_path_buf()
        };

        assert!(!output_path.exists());
        cleanup_folder(&folder);
    }
}
