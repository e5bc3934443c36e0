//! Per-post media storage.
//!
//! Every post owns one directory `{root}/{post_id}` holding its uploaded
//! images. The directory is created on first upload and removed as a whole
//! when the post is deleted.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use image::ImageFormat;
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::models::posts::Upload;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("File type .{0} is not allowed")]
    DisallowedExtension(String),

    #[error("The file name is not usable")]
    InvalidFilename,

    #[error("The file content does not match its .{0} extension")]
    ContentMismatch(String),

    #[error("Media file not found")]
    NotFound,

    #[error("Path escapes the post media directory")]
    OutsideDirectory,

    #[error("Storage failure: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    allowed_extensions: Vec<String>,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, allowed_extensions: Vec<String>) -> Self {
        Self {
            root: root.into(),
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn post_dir(&self, post_id: i64) -> PathBuf {
        self.root.join(post_id.to_string())
    }

    /// Checks an upload without touching the filesystem and returns the
    /// on-disk name it would be stored under.
    pub fn validate(&self, upload: &Upload) -> Result<String, MediaError> {
        let filename = sanitize_filename(&upload.filename).ok_or(MediaError::InvalidFilename)?;

        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .ok_or_else(|| MediaError::DisallowedExtension(String::new()))?;

        if !self.allowed_extensions.contains(&extension) {
            return Err(MediaError::DisallowedExtension(extension));
        }

        let expected = ImageFormat::from_extension(&extension);
        let detected = image::guess_format(&upload.bytes).ok();
        if expected.is_none() || expected != detected {
            return Err(MediaError::ContentMismatch(extension));
        }

        Ok(filename)
    }

    /// Stores `upload` in the post's directory and returns the stored name.
    /// An existing file with the same sanitized name is overwritten.
    pub async fn store(&self, post_id: i64, upload: &Upload) -> Result<String, MediaError> {
        let filename = self.validate(upload)?;
        let dir = self.post_dir(post_id);
        fs::create_dir_all(&dir).await?;

        let partial = dir.join(format!(".{}.part", filename));
        let target = dir.join(&filename);
        if let Err(err) = fs::write(&partial, &upload.bytes).await {
            let _ = fs::remove_file(&partial).await;
            return Err(err.into());
        }
        if let Err(err) = fs::rename(&partial, &target).await {
            let _ = fs::remove_file(&partial).await;
            return Err(err.into());
        }

        info!(post_id, filename = %filename, bytes = upload.bytes.len(), "Stored media file");
        Ok(filename)
    }

    /// Stores the new upload, then drops `old_filename` if it differs.
    pub async fn replace(
        &self,
        post_id: i64,
        old_filename: Option<&str>,
        upload: &Upload,
    ) -> Result<String, MediaError> {
        let filename = self.store(post_id, upload).await?;

        if let Some(old) = old_filename.filter(|old| *old != filename) {
            match self.resolve(post_id, old).await {
                Ok(path) => match fs::remove_file(&path).await {
                    Ok(()) => debug!(post_id, filename = old, "Removed replaced media file"),
                    Err(err) if err.kind() == ErrorKind::NotFound => {}
                    Err(err) => return Err(err.into()),
                },
                Err(MediaError::NotFound) => {}
                Err(MediaError::OutsideDirectory) => {
                    warn!(post_id, filename = old, "Ignoring unsafe stored image name");
                }
                Err(err) => return Err(err),
            }
        }

        Ok(filename)
    }

    /// Removes the post's directory and everything in it. A missing
    /// directory is not an error.
    pub async fn delete(&self, post_id: i64) -> Result<(), MediaError> {
        match fs::remove_dir_all(self.post_dir(post_id)).await {
            Ok(()) => {
                info!(post_id, "Removed media directory");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Canonical path of `filename` inside the post's directory. Rejects any
    /// name that would resolve elsewhere, including through symlinks.
    pub async fn resolve(&self, post_id: i64, filename: &str) -> Result<PathBuf, MediaError> {
        if filename.is_empty()
            || filename == "."
            || filename == ".."
            || filename.contains(['/', '\\', '\0'])
        {
            return Err(MediaError::OutsideDirectory);
        }

        let dir = match fs::canonicalize(self.post_dir(post_id)).await {
            Ok(dir) => dir,
            Err(err) if err.kind() == ErrorKind::NotFound => return Err(MediaError::NotFound),
            Err(err) => return Err(err.into()),
        };

        let path = match fs::canonicalize(dir.join(filename)).await {
            Ok(path) => path,
            Err(err) if err.kind() == ErrorKind::NotFound => return Err(MediaError::NotFound),
            Err(err) => return Err(err.into()),
        };

        if !path.starts_with(&dir) {
            return Err(MediaError::OutsideDirectory);
        }
        if !fs::metadata(&path).await?.is_file() {
            return Err(MediaError::NotFound);
        }

        Ok(path)
    }
}

/// Reduces a client-supplied name to a safe bare filename: last path
/// component only, ASCII letters, digits, `.`, `_` and `-`.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let cleaned = cleaned.trim_start_matches(['.', '_']);
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        None
    } else {
        Some(cleaned.to_string())
    }
}
