//! Remote fetch service abstraction.
//!
//! The fetcher downloads content the local store does not have yet and
//! reports progress to registered listeners, possibly from another thread and
//! possibly long after the request was made.

use std::sync::Arc;

use crate::model::{AttachmentId, MeetingResponse, MessageId};

/// Progress report from the remote fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchProgress {
    /// Percentage milestone. `0` means started, `100` means done.
    Progress(u8),
    /// The fetch failed.
    Error(String),
}

/// The milestones the pipeline acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    /// Fetch accepted and running.
    Started,
    /// Content is now in the local store.
    Done,
    /// Fetch gave up.
    Failed,
}

impl FetchProgress {
    /// Maps a report to the milestone it represents.
    ///
    /// Intermediate percentages carry no milestone and yield `None`.
    #[must_use]
    pub const fn phase(&self) -> Option<FetchPhase> {
        match self {
            Self::Progress(0) => Some(FetchPhase::Started),
            Self::Progress(100) => Some(FetchPhase::Done),
            Self::Progress(_) => None,
            Self::Error(_) => Some(FetchPhase::Failed),
        }
    }
}

/// Receives progress notifications from a [`RemoteFetcher`].
///
/// Methods may be called from any thread.
pub trait FetchListener: Send + Sync {
    /// Progress of a full message load.
    fn load_message_progress(&self, message_id: MessageId, progress: FetchProgress);

    /// Progress of an attachment download.
    fn load_attachment_progress(
        &self,
        message_id: MessageId,
        attachment_id: AttachmentId,
        progress: FetchProgress,
    );
}

/// Handle returned when a listener is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Fetches message content and attachments from the remote service.
///
/// Requests return immediately; outcomes arrive through listeners. Requests
/// are keyed by id so concurrent fetches for different ids do not interfere.
pub trait RemoteFetcher: Send + Sync {
    /// Register a listener for progress notifications.
    fn add_listener(&self, listener: Arc<dyn FetchListener>) -> ListenerId;

    /// Remove a previously registered listener. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);

    /// Fetch the full content of a partially synchronized message.
    fn request_full_load(&self, message_id: MessageId);

    /// Download an attachment of `owner`.
    fn request_attachment(&self, attachment_id: AttachmentId, owner: MessageId);

    /// Best-effort cancellation of an attachment download.
    fn cancel_attachment(&self, attachment_id: AttachmentId);

    /// Send a reply to the meeting invitation carried by `message_id`.
    fn send_meeting_response(&self, message_id: MessageId, response: MeetingResponse);
}
