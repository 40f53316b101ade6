//! Domain models for the message view.

mod attachment;
mod body;
mod message;

pub use attachment::{
    AttachmentDescriptor, AttachmentId, AttachmentIntent, ListedAttachment, PendingDownload,
};
pub use body::{BodyContent, RenderedBody};
pub use message::{
    AccountId, LoadCompleteness, MailboxId, MeetingInfo, MeetingResponse, MessageId,
    MessageRecord,
};
