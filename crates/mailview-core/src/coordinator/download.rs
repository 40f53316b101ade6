//! Attachment save/open actions.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use super::event::TransientErrorKind;
use crate::model::{AttachmentId, AttachmentIntent};
use crate::traits::{AttachmentSink, ContentStore};

/// Why an attachment action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionError {
    /// A save was requested but there is no storage to save to.
    #[error("no storage available for saving attachments")]
    NoStorage,

    /// No message is focused.
    #[error("no message is focused")]
    NoFocus,

    /// The attachment is not in the focused message's list.
    #[error("unknown attachment: {0}")]
    UnknownAttachment(AttachmentId),
}

/// What was done with a downloaded attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Written to this path.
    Saved(PathBuf),
    /// Handed to the system viewer.
    Opened,
}

/// Performs the user's intent on a freshly downloaded attachment.
///
/// Re-reads the attachment record so the content location reflects the
/// finished download.
pub(crate) async fn complete(
    store: Arc<dyn ContentStore>,
    sink: Arc<dyn AttachmentSink>,
    attachment_id: AttachmentId,
    intent: AttachmentIntent,
) -> Result<DownloadOutcome, TransientErrorKind> {
    let failure = match intent {
        AttachmentIntent::Save => TransientErrorKind::AttachmentNotSaved,
        AttachmentIntent::Open => TransientErrorKind::AttachmentNotOpened,
    };

    let attachment = match store.load_attachment(attachment_id).await {
        Ok(Some(attachment)) => attachment,
        Ok(None) => {
            tracing::warn!("Attachment {} vanished before completion", attachment_id);
            return Err(failure);
        }
        Err(e) => {
            tracing::warn!("Failed to load attachment {}: {}", attachment_id, e);
            return Err(failure);
        }
    };

    let result = match intent {
        AttachmentIntent::Save => sink.save(&attachment).await.map(DownloadOutcome::Saved),
        AttachmentIntent::Open => sink.open(&attachment).await.map(|()| DownloadOutcome::Opened),
    };

    result.map_err(|e| {
        tracing::warn!("Attachment {} action failed: {}", attachment_id, e);
        failure
    })
}
