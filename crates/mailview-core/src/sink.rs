//! File-system attachment sink.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::model::AttachmentDescriptor;
use crate::traits::AttachmentSink;
use crate::{Error, Result};

/// Saves attachments into a download directory and opens them with the
/// desktop's default application.
#[derive(Debug, Clone)]
pub struct FileSystemSink {
    download_dir: Option<PathBuf>,
}

impl FileSystemSink {
    /// Creates a sink saving into `download_dir`. With `None`, saving is
    /// unavailable but opening still works.
    #[must_use]
    pub const fn new(download_dir: Option<PathBuf>) -> Self {
        Self { download_dir }
    }

    /// Directory attachments are saved into.
    #[must_use]
    pub fn download_dir(&self) -> Option<&Path> {
        self.download_dir.as_deref()
    }
}

/// Local path of a downloaded attachment's content.
fn content_path(attachment: &AttachmentDescriptor) -> Result<PathBuf> {
    let location = attachment.content_location.as_deref().ok_or_else(|| {
        Error::NotFound(format!("attachment {} has not been downloaded", attachment.id))
    })?;
    Ok(PathBuf::from(
        location.strip_prefix("file://").unwrap_or(location),
    ))
}

/// First name in `dir` not already taken, trying `name`, `name-1`, `name-2`...
async fn unique_path(dir: &Path, name: &str) -> Result<PathBuf> {
    let file_name = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("attachment");
    let candidate = dir.join(file_name);
    if !tokio::fs::try_exists(&candidate).await? {
        return Ok(candidate);
    }

    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    let extension = path.extension().and_then(|e| e.to_str());

    let mut n = 1u32;
    loop {
        let numbered = match extension {
            Some(ext) => format!("{stem}-{n}.{ext}"),
            None => format!("{stem}-{n}"),
        };
        let candidate = dir.join(numbered);
        if !tokio::fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }
        n += 1;
    }
}

#[async_trait]
impl AttachmentSink for FileSystemSink {
    fn storage_available(&self) -> bool {
        self.download_dir.is_some()
    }

    async fn save(&self, attachment: &AttachmentDescriptor) -> Result<PathBuf> {
        let dir = self
            .download_dir
            .as_deref()
            .ok_or_else(|| Error::Config("no download directory configured".to_string()))?;
        let source = content_path(attachment)?;

        tokio::fs::create_dir_all(dir).await?;
        let target = unique_path(dir, &attachment.name).await?;
        tokio::fs::copy(&source, &target).await?;

        tracing::info!("Saved attachment {} to {:?}", attachment.id, target);
        Ok(target)
    }

    async fn open(&self, attachment: &AttachmentDescriptor) -> Result<()> {
        let path = content_path(attachment)?;
        opener::open(&path).map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;
        tracing::debug!("Opened attachment {} from {:?}", attachment.id, path);
        Ok(())
    }
}
