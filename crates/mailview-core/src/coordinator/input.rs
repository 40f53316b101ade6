//! Everything the coordinator reacts to, and the handle used to send it.

use tokio::sync::mpsc::UnboundedSender;

use super::download::DownloadOutcome;
use super::event::TransientErrorKind;
use crate::LoadError;
use crate::model::{
    AttachmentDescriptor, AttachmentId, AttachmentIntent, BodyContent, MeetingResponse, MessageId,
    MessageRecord,
};
use crate::token::FocusToken;
use crate::traits::FetchPhase;

/// User or platform requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    /// Show a message.
    Focus {
        /// Message to show.
        id: MessageId,
        /// Whether an incomplete message may be fetched remotely.
        allow_remote_fetch: bool,
    },
    /// Step to the next older message.
    MoveOlder,
    /// Step to the next newer message.
    MoveNewer,
    /// Flip the favorite flag.
    ToggleFavorite,
    /// Mark the message unread again.
    MarkUnread,
    /// Delete the message and move to a neighbour.
    Delete,
    /// Save or open an attachment.
    AttachmentAction {
        /// Attachment to act on.
        id: AttachmentId,
        /// Save or open.
        intent: AttachmentIntent,
    },
    /// Load remote images in the displayed body.
    ShowPictures,
    /// Reply to the meeting invitation and move on.
    RespondToInvite(MeetingResponse),
    /// The navigation source lost the focused message.
    CursorMessageNotFound,
    /// The navigation source's ordering changed.
    CursorMessagesChanged,
    /// Stop receiving remote notifications.
    Pause,
    /// Resume receiving remote notifications.
    Resume,
    /// Tear the view down.
    Close,
}

/// Input applied serially on the coordinator's task.
#[derive(Debug)]
pub enum Input {
    /// User or platform request.
    Command(ViewCommand),
    /// Stage 1 result.
    MetadataLoaded {
        /// Token the load was issued under.
        token: FocusToken,
        /// Loaded record.
        result: Result<MessageRecord, LoadError>,
    },
    /// Stage 2 result.
    BodyLoaded {
        /// Token the load was issued under.
        token: FocusToken,
        /// Loaded body.
        result: Result<BodyContent, LoadError>,
    },
    /// Stage 3 result.
    AttachmentsLoaded {
        /// Token the load was issued under.
        token: FocusToken,
        /// Loaded attachment records.
        result: Result<Vec<AttachmentDescriptor>, LoadError>,
    },
    /// Remote full-load milestone.
    RemoteFetchProgress {
        /// Token the fetch was requested under.
        token: FocusToken,
        /// Milestone reached.
        phase: FetchPhase,
    },
    /// Attachment download milestone.
    AttachmentFetchProgress {
        /// Token of the focus owning the attachment.
        token: FocusToken,
        /// Attachment being downloaded.
        attachment_id: AttachmentId,
        /// Milestone reached.
        phase: FetchPhase,
    },
    /// Save or open of a downloaded attachment finished.
    DownloadFinished {
        /// Attachment acted on.
        attachment_id: AttachmentId,
        /// What happened.
        result: Result<DownloadOutcome, TransientErrorKind>,
    },
}

/// Cloneable sender for [`ViewCommand`]s.
#[derive(Debug, Clone)]
pub struct ViewHandle {
    inputs: UnboundedSender<Input>,
}

impl ViewHandle {
    pub(crate) const fn new(inputs: UnboundedSender<Input>) -> Self {
        Self { inputs }
    }

    /// Send a command. Returns `false` once the coordinator has stopped.
    pub fn send(&self, command: ViewCommand) -> bool {
        self.inputs.send(Input::Command(command)).is_ok()
    }

    /// Show a message, allowing a remote fetch if it is incomplete.
    pub fn focus(&self, id: MessageId) -> bool {
        self.send(ViewCommand::Focus {
            id,
            allow_remote_fetch: true,
        })
    }

    /// Tear the view down.
    pub fn close(&self) -> bool {
        self.send(ViewCommand::Close)
    }
}
