//! In-memory message ordering for older/newer navigation.

use crate::Result;
use crate::model::{MailboxId, MessageId};
use crate::store::SqliteContentStore;
use crate::traits::NavigationCursor;

/// A mailbox's messages, newest first, with a cursor.
///
/// "Older" moves towards the end of the list, "newer" towards the start.
#[derive(Debug, Clone, Default)]
pub struct MessageOrder {
    ids: Vec<MessageId>,
    position: Option<usize>,
}

impl MessageOrder {
    /// Creates an ordering from ids sorted newest first.
    #[must_use]
    pub const fn new(ids: Vec<MessageId>) -> Self {
        Self {
            ids,
            position: None,
        }
    }

    /// Loads the ordering of `mailbox_id` from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn from_store(store: &SqliteContentStore, mailbox_id: MailboxId) -> Result<Self> {
        Ok(Self::new(store.list_message_ids(mailbox_id).await?))
    }

    /// Newest message in the ordering.
    #[must_use]
    pub fn first(&self) -> Option<MessageId> {
        self.ids.first().copied()
    }

    /// Number of messages in the ordering.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the ordering is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl NavigationCursor for MessageOrder {
    fn move_to(&mut self, id: MessageId) -> bool {
        match self.ids.iter().position(|&i| i == id) {
            Some(index) => {
                self.position = Some(index);
                true
            }
            None => false,
        }
    }

    fn move_older(&mut self) -> Option<MessageId> {
        let next = self.position? + 1;
        let id = *self.ids.get(next)?;
        self.position = Some(next);
        Some(id)
    }

    fn move_newer(&mut self) -> Option<MessageId> {
        let next = self.position?.checked_sub(1)?;
        let id = *self.ids.get(next)?;
        self.position = Some(next);
        Some(id)
    }

    fn can_move_older(&self) -> bool {
        self.position.is_some_and(|p| p + 1 < self.ids.len())
    }

    fn can_move_newer(&self) -> bool {
        self.position.is_some_and(|p| p > 0)
    }

    fn current(&self) -> Option<MessageId> {
        self.position.and_then(|p| self.ids.get(p).copied())
    }

    fn remove(&mut self, id: MessageId) {
        let Some(index) = self.ids.iter().position(|&i| i == id) else {
            return;
        };
        self.ids.remove(index);
        self.position = match self.position {
            Some(p) if p == index => None,
            Some(p) if p > index => Some(p - 1),
            other => other,
        };
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn order() -> MessageOrder {
        MessageOrder::new(vec![MessageId(30), MessageId(20), MessageId(10)])
    }

    #[test]
    fn test_unpositioned_cursor_cannot_move() {
        let mut order = order();
        assert!(!order.can_move_older());
        assert!(!order.can_move_newer());
        assert_eq!(order.move_older(), None);
        assert_eq!(order.current(), None);
    }

    #[test]
    fn test_move_between_neighbours() {
        let mut order = order();
        assert!(order.move_to(MessageId(20)));
        assert!(order.can_move_older());
        assert!(order.can_move_newer());

        assert_eq!(order.move_older(), Some(MessageId(10)));
        assert!(!order.can_move_older());
        assert_eq!(order.move_older(), None);
        assert_eq!(order.current(), Some(MessageId(10)));

        assert_eq!(order.move_newer(), Some(MessageId(20)));
        assert_eq!(order.move_newer(), Some(MessageId(30)));
        assert_eq!(order.move_newer(), None);
        assert!(!order.can_move_newer());
    }

    #[test]
    fn test_move_to_unknown_keeps_position() {
        let mut order = order();
        order.move_to(MessageId(30));
        assert!(!order.move_to(MessageId(99)));
        assert_eq!(order.current(), Some(MessageId(30)));
    }

    #[test]
    fn test_remove_keeps_cursor_on_its_message() {
        let mut order = order();
        order.move_to(MessageId(10));

        order.remove(MessageId(30));
        assert_eq!(order.current(), Some(MessageId(10)));
        assert_eq!(order.move_newer(), Some(MessageId(20)));
        assert!(!order.can_move_newer());

        order.remove(MessageId(99));
        assert_eq!(order.len(), 2);
    }

    #[test]
    fn test_remove_current_unpositions_cursor() {
        let mut order = order();
        order.move_to(MessageId(20));

        order.remove(MessageId(20));
        assert_eq!(order.current(), None);
        assert!(!order.move_to(MessageId(20)));
        assert_eq!(order.len(), 2);
    }

    #[tokio::test]
    async fn test_from_empty_store() {
        let store = SqliteContentStore::in_memory().await.unwrap();
        let order = MessageOrder::from_store(&store, MailboxId(1)).await.unwrap();
        assert!(order.is_empty());
        assert_eq!(order.len(), 0);
        assert_eq!(order.first(), None);
    }
}
