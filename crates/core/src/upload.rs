//! Gallery upload storage.
//!
//! Writes accepted image uploads into the gallery directory and returns the
//! [`GalleryImage`] entries for the files that actually landed on disk.
//! Problems with individual files are logged and the file is skipped; only a
//! directory that cannot be made writable fails the whole batch.

use std::path::{Path, PathBuf};

use crate::composite::GalleryImage;
use crate::error::CoreError;
use crate::gallery::{
    caption_from_filename, stored_file_name, upload_extension, validate_upload, DEFAULT_ALT,
};

/// Transport-level failure reported for a single uploaded part.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("the file was only partially uploaded")]
    Partial,

    #[error("no file was uploaded for this field")]
    NoFile,

    #[error("the file exceeds the request size limit")]
    ExceedsRequestLimit,
}

/// One file received in a multipart request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
    pub data: Vec<u8>,
    /// Set when the part could not be received intact.
    pub error: Option<TransportError>,
}

impl UploadedFile {
    /// A fully received file.
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            size: data.len() as u64,
            data,
            error: None,
        }
    }

    /// A part that failed in transit.
    pub fn failed(file_name: impl Into<String>, error: TransportError) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: String::new(),
            size: 0,
            data: Vec::new(),
            error: Some(error),
        }
    }
}

/// Where accepted uploads are written and how they are addressed.
#[derive(Debug, Clone)]
pub struct GalleryTarget {
    /// Directory the files are written into.
    pub dir: PathBuf,
    /// Relative URL prefix stored in `gallery_images` (e.g. `uploads/gallery`).
    pub url_prefix: String,
    /// `alt` text for stored entries; usually the project title.
    pub alt: String,
}

impl GalleryTarget {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>, alt: &str) -> Self {
        let alt = alt.trim();
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into(),
            alt: if alt.is_empty() {
                DEFAULT_ALT.to_string()
            } else {
                alt.to_string()
            },
        }
    }

    fn url_for(&self, stored_name: &str) -> String {
        let prefix = self.url_prefix.trim_end_matches('/');
        if prefix.is_empty() {
            stored_name.to_string()
        } else {
            format!("{prefix}/{stored_name}")
        }
    }

    /// On-disk path of an entry this target produced, if `url` is one.
    fn path_for(&self, url: &str) -> Option<PathBuf> {
        let prefix = self.url_prefix.trim_end_matches('/');
        let name = if prefix.is_empty() {
            url
        } else {
            url.strip_prefix(prefix)?.strip_prefix('/')?
        };
        if name.is_empty() || name.contains('/') || name.contains("..") {
            return None;
        }
        Some(self.dir.join(name))
    }
}

/// Store every acceptable file and return their gallery entries in input
/// order.
///
/// Returns [`CoreError::PermissionDenied`] before touching any file if the
/// target directory cannot be created or made writable.
pub async fn store_uploads(
    target: &GalleryTarget,
    files: Vec<UploadedFile>,
) -> Result<Vec<GalleryImage>, CoreError> {
    if files.is_empty() {
        return Ok(Vec::new());
    }

    ensure_writable_dir(&target.dir).await?;

    let batch_millis = chrono::Utc::now().timestamp_millis();
    let mut stored = Vec::with_capacity(files.len());

    for (index, file) in files.into_iter().enumerate() {
        if let Some(err) = &file.error {
            tracing::warn!(file = %file.file_name, error = %err, "Skipping failed upload");
            continue;
        }

        if let Err(rejection) = validate_upload(&file.content_type, file.size) {
            tracing::warn!(
                file = %file.file_name,
                content_type = %file.content_type,
                size = file.size,
                reason = %rejection,
                "Skipping rejected upload"
            );
            continue;
        }

        let ext = upload_extension(&file.file_name, &file.content_type);
        let name = stored_file_name(batch_millis, index, &ext);
        let path = target.dir.join(&name);

        if let Err(e) = tokio::fs::write(&path, &file.data).await {
            tracing::warn!(file = %file.file_name, path = %path.display(), error = %e, "Failed to write upload");
            continue;
        }

        if !is_readable_file(&path).await {
            tracing::warn!(file = %file.file_name, path = %path.display(), "Stored upload is not readable, dropping");
            continue;
        }

        tracing::info!(file = %file.file_name, stored = %name, size = file.size, "Stored gallery upload");
        stored.push(GalleryImage {
            url: target.url_for(&name),
            alt: target.alt.clone(),
            caption: caption_from_filename(&file.file_name),
        });
    }

    Ok(stored)
}

/// Remove files written by [`store_uploads`] for a save that did not go
/// through. Entries that do not belong to `target` are left alone.
pub async fn discard_uploads(target: &GalleryTarget, images: &[GalleryImage]) {
    for image in images {
        let Some(path) = target.path_for(&image.url) else {
            continue;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => tracing::info!(path = %path.display(), "Discarded gallery upload"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to discard gallery upload"),
        }
    }
}

/// Make sure `dir` exists and accepts new files.
///
/// Creation is attempted with mode `0755`, then `0777`. An existing directory
/// that rejects writes is relaxed to `0775`, then `0777`.
pub async fn ensure_writable_dir(dir: &Path) -> Result<(), CoreError> {
    if !tokio::fs::try_exists(dir).await.unwrap_or(false) {
        create_dir(dir).await?;
    }

    if probe_writable(dir).await {
        return Ok(());
    }

    for mode in [0o775, 0o777] {
        if let Err(e) = set_mode(dir, mode).await {
            tracing::warn!(dir = %dir.display(), mode = %format!("{mode:o}"), error = %e, "Failed to relax directory permissions");
            continue;
        }
        if probe_writable(dir).await {
            return Ok(());
        }
    }

    Err(CoreError::PermissionDenied(format!(
        "Upload directory {} is not writable",
        dir.display()
    )))
}

async fn create_dir(dir: &Path) -> Result<(), CoreError> {
    let mut last_error = None;
    for mode in [0o755, 0o777] {
        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(mode);
        match builder.create(dir).await {
            Ok(()) => {
                tracing::info!(dir = %dir.display(), mode = %format!("{mode:o}"), "Created upload directory");
                return Ok(());
            }
            Err(e) => last_error = Some(e),
        }
    }
    let detail = last_error.map(|e| e.to_string()).unwrap_or_default();
    Err(CoreError::PermissionDenied(format!(
        "Cannot create upload directory {}: {detail}",
        dir.display()
    )))
}

#[cfg(unix)]
async fn set_mode(dir: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(dir, std::fs::Permissions::from_mode(mode)).await
}

#[cfg(not(unix))]
async fn set_mode(dir: &Path, _mode: u32) -> std::io::Result<()> {
    let mut perms = tokio::fs::metadata(dir).await?.permissions();
    perms.set_readonly(false);
    tokio::fs::set_permissions(dir, perms).await
}

async fn probe_writable(dir: &Path) -> bool {
    let probe = dir.join(format!(".write_probe_{}", std::process::id()));
    match tokio::fs::write(&probe, b"").await {
        Ok(()) => {
            let _ = tokio::fs::remove_file(&probe).await;
            true
        }
        Err(_) => false,
    }
}

async fn is_readable_file(path: &Path) -> bool {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => tokio::fs::File::open(path).await.is_ok(),
        _ => false,
    }
}
