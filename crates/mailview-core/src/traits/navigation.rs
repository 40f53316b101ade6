//! Position within the ordered message list of a mailbox.

use crate::model::MessageId;

/// Tracks where the viewed message sits in its mailbox so the view can step
/// to the next older or newer message.
///
/// Implementations:
/// - In-memory ordering: [`crate::MessageOrder`]
pub trait NavigationCursor: Send {
    /// Position the cursor on `id`. Returns `false` if the mailbox does not
    /// contain it.
    fn move_to(&mut self, id: MessageId) -> bool;

    /// Step to the next older message and return it.
    fn move_older(&mut self) -> Option<MessageId>;

    /// Step to the next newer message and return it.
    fn move_newer(&mut self) -> Option<MessageId>;

    /// Whether an older message exists.
    fn can_move_older(&self) -> bool;

    /// Whether a newer message exists.
    fn can_move_newer(&self) -> bool;

    /// Message under the cursor.
    fn current(&self) -> Option<MessageId>;

    /// Drop `id` from the ordering. The cursor keeps its message unless that
    /// was `id`, in which case it is left unpositioned.
    fn remove(&mut self, id: MessageId);
}
