//! Destination for fetched attachments.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::Result;
use crate::model::AttachmentDescriptor;

/// Performs the user's save or open action once an attachment is fetched.
///
/// Implementations:
/// - File system + desktop opener: [`crate::FileSystemSink`]
#[async_trait]
pub trait AttachmentSink: Send + Sync {
    /// Whether there is somewhere to save to. Checked before any fetch is
    /// started for a save request.
    fn storage_available(&self) -> bool;

    /// Copy the attachment's content to storage and return the written path.
    async fn save(&self, attachment: &AttachmentDescriptor) -> Result<PathBuf>;

    /// Hand the attachment's content to the system viewer.
    async fn open(&self, attachment: &AttachmentDescriptor) -> Result<()>;
}
