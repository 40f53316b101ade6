//! Local message store abstraction.

use async_trait::async_trait;

use crate::Result;
use crate::model::{AttachmentDescriptor, AttachmentId, BodyContent, MessageId, MessageRecord};

/// Local store of messages, bodies and attachment records.
///
/// Reads are expensive (disk or database) and are only ever awaited from
/// background tasks, never from the coordinator itself.
///
/// Implementations:
/// - `SQLite`: [`crate::SqliteContentStore`]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Load a message's metadata.
    ///
    /// # Arguments
    /// * `id` - Message ID
    ///
    /// Returns `Ok(None)` when the message does not exist.
    async fn load_message(&self, id: MessageId) -> Result<Option<MessageRecord>>;

    /// Load a message's body parts.
    ///
    /// # Arguments
    /// * `id` - Message ID
    ///
    /// Returns `Ok(None)` when no body is stored for the message.
    async fn load_body(&self, id: MessageId) -> Result<Option<BodyContent>>;

    /// Load every attachment record of a message.
    ///
    /// # Arguments
    /// * `id` - Message ID
    async fn load_attachments(&self, id: MessageId) -> Result<Vec<AttachmentDescriptor>>;

    /// Load a single attachment record.
    ///
    /// # Arguments
    /// * `id` - Attachment ID
    async fn load_attachment(&self, id: AttachmentId) -> Result<Option<AttachmentDescriptor>>;

    /// Set the read flag.
    async fn set_read(&self, id: MessageId, is_read: bool) -> Result<()>;

    /// Set the favorite flag.
    async fn set_favorite(&self, id: MessageId, is_favorite: bool) -> Result<()>;

    /// Delete a message together with its body and attachments.
    async fn delete_message(&self, id: MessageId) -> Result<()>;
}
