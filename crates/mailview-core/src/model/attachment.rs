//! Attachment models.

use serde::{Deserialize, Serialize};

use super::MessageId;

/// Unique identifier for an attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttachmentId(pub i64);

impl std::fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An attachment as recorded in the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentDescriptor {
    /// Attachment id.
    pub id: AttachmentId,
    /// Message the attachment belongs to.
    pub message_id: MessageId,
    /// File name shown to the user.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type as stored.
    pub content_type: String,
    /// `Content-ID` for inline parts, without angle brackets.
    pub content_id: Option<String>,
    /// Where the downloaded content can be read from, once fetched.
    pub content_location: Option<String>,
}

/// An attachment offered to the user rather than substituted inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedAttachment {
    /// The stored attachment.
    pub descriptor: AttachmentDescriptor,
    /// MIME type after inference from the file name.
    pub content_type: String,
    /// Whether the "open" action is offered.
    pub can_view: bool,
    /// Whether the "save" action is offered.
    pub can_save: bool,
}

/// What the user wants done with an attachment once it is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentIntent {
    /// Copy it to the download directory.
    Save,
    /// Hand it to the system viewer.
    Open,
}

/// The single outstanding attachment fetch requested from the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDownload {
    /// Attachment being fetched.
    pub attachment_id: AttachmentId,
    /// Save or open on completion.
    pub intent: AttachmentIntent,
    /// Name shown in progress notices.
    pub name: String,
}
