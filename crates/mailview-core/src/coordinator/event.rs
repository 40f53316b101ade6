//! Events emitted to the presentation layer.

use std::path::PathBuf;

use crate::model::{AttachmentId, ListedAttachment, MeetingResponse, MessageId, MessageRecord};

/// What a progress indicator refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressKind {
    /// Fetching the full message from the remote service.
    RemoteFetch,
    /// Downloading an attachment.
    AttachmentFetch {
        /// Display name of the attachment.
        name: String,
    },
}

/// Short-lived notices shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientErrorKind {
    /// The remote message fetch failed.
    RemoteFetchFailed,
    /// The attachment download failed.
    AttachmentFetchFailed,
    /// The body could not be read from the store.
    BodyLoadFailed,
    /// The attachment list could not be read from the store.
    AttachmentsLoadFailed,
    /// There is nowhere to save attachments.
    NoStorage,
    /// A downloaded attachment could not be saved.
    AttachmentNotSaved,
    /// A downloaded attachment could not be opened.
    AttachmentNotOpened,
}

/// UI update emitted by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// Focus changed; clear the header, body and attachment list.
    Reset,
    /// Header fields are available.
    MetadataReady(MessageRecord),
    /// Show a placeholder page instead of a body.
    PlaceholderBody(String),
    /// Display this HTML. Sent again if inline images were substituted.
    BodyReady {
        /// Document to display.
        html: String,
        /// Whether the document references images.
        has_images: bool,
    },
    /// Redisplay this HTML with remote images allowed.
    PicturesShown {
        /// Document to display.
        html: String,
    },
    /// A meeting invitation reply was handed to the remote service.
    InviteResponseSent(MeetingResponse),
    /// An attachment was added to the list.
    AttachmentAvailable(ListedAttachment),
    /// The attachment list is final.
    AttachmentListChanged,
    /// Refresh the preview of an attachment.
    AttachmentThumbnailUpdated(AttachmentId),
    /// Enable or disable every attachment action control.
    AttachmentControlsEnabled(bool),
    /// An attachment was written to disk.
    AttachmentSaved {
        /// Written file.
        path: PathBuf,
    },
    /// An attachment was handed to the system viewer.
    AttachmentOpened(AttachmentId),
    /// Show or hide a progress indicator.
    Progress(ProgressKind, bool),
    /// Show a short-lived notice.
    TransientError(TransientErrorKind),
    /// Update the older/newer navigation controls.
    NavigationChanged {
        /// Whether an older message exists.
        can_move_older: bool,
        /// Whether a newer message exists.
        can_move_newer: bool,
    },
    /// The favorite flag of the focused message changed.
    FavoriteChanged(bool),
    /// A message was deleted from the view.
    MessageDeleted(MessageId),
    /// Nothing left to show; close the view.
    AbandonView,
}
