//! Image uploads stored on local disk and served under `/uploads`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;

/// Largest accepted upload (2 MiB)
pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "svg", "webp"];

/// URL prefix stored files are reachable under
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file")]
    MissingFile,
    #[error("File too large")]
    TooLarge { size: usize },
    #[error("Unsupported type")]
    UnsupportedType { extension: Option<String> },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub file_name: String,
    /// Public path, e.g. `/uploads/1700000000000-logo.png`
    pub path: String,
}

/// Replace every character outside `[A-Za-z0-9.-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// Size and type checks, in that order.
pub fn validate_upload(name: &str, size: usize) -> Result<(), UploadError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge { size });
    }
    let extension = extension_of(name);
    match extension.as_deref() {
        Some(ext) if ALLOWED_EXTENSIONS.contains(&ext) => Ok(()),
        _ => Err(UploadError::UnsupportedType { extension }),
    }
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validate and write `bytes`, creating the upload directory if needed.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<StoredUpload, UploadError> {
        validate_upload(original_name, bytes.len())?;

        tokio::fs::create_dir_all(&self.dir).await?;

        let file_name = format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            sanitize_file_name(original_name)
        );
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;

        tracing::info!(file = %file_name, size = bytes.len(), "Stored upload");

        Ok(StoredUpload {
            path: format!("{PUBLIC_PREFIX}/{file_name}"),
            file_name,
        })
    }
}
