//! Message content repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};

use crate::{Error, Result};
use crate::model::{
    AccountId, AttachmentDescriptor, AttachmentId, BodyContent, LoadCompleteness, MailboxId,
    MeetingInfo, MessageId, MessageRecord,
};
use crate::traits::ContentStore;

/// Content store backed by a `SQLite` database.
pub struct SqliteContentStore {
    pool: SqlitePool,
}

impl SqliteContentStore {
    /// Create a new store with the given database path.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Initialize database schema.
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY,
                mailbox_id INTEGER NOT NULL,
                account_id INTEGER NOT NULL,
                completeness TEXT NOT NULL DEFAULT 'incomplete',
                is_favorite INTEGER NOT NULL DEFAULT 0,
                is_read INTEGER NOT NULL DEFAULT 0,
                from_display TEXT NOT NULL DEFAULT '',
                to_display TEXT NOT NULL DEFAULT '',
                cc_display TEXT NOT NULL DEFAULT '',
                subject TEXT NOT NULL DEFAULT '',
                timestamp TEXT NOT NULL,
                has_attachments INTEGER NOT NULL DEFAULT 0,
                meeting_invite INTEGER NOT NULL DEFAULT 0,
                meeting_start TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS bodies (
                message_id INTEGER PRIMARY KEY,
                body_text TEXT,
                body_html TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS attachments (
                id INTEGER PRIMARY KEY,
                message_id INTEGER NOT NULL,
                name TEXT NOT NULL DEFAULT '',
                size INTEGER NOT NULL DEFAULT 0,
                content_type TEXT NOT NULL DEFAULT '',
                content_id TEXT,
                content_location TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_messages_mailbox
            ON messages(mailbox_id, timestamp)
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_attachments_message
            ON attachments(message_id)
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert or replace a message record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn upsert_message(&self, message: &MessageRecord) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO messages
                (id, mailbox_id, account_id, completeness, is_favorite, is_read,
                 from_display, to_display, cc_display, subject, timestamp,
                 has_attachments, meeting_invite, meeting_start)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                mailbox_id = excluded.mailbox_id,
                account_id = excluded.account_id,
                completeness = excluded.completeness,
                is_favorite = excluded.is_favorite,
                is_read = excluded.is_read,
                from_display = excluded.from_display,
                to_display = excluded.to_display,
                cc_display = excluded.cc_display,
                subject = excluded.subject,
                timestamp = excluded.timestamp,
                has_attachments = excluded.has_attachments,
                meeting_invite = excluded.meeting_invite,
                meeting_start = excluded.meeting_start
            ",
        )
        .bind(message.id.0)
        .bind(message.mailbox_id.0)
        .bind(message.account_id.0)
        .bind(message.completeness.as_str())
        .bind(message.is_favorite)
        .bind(message.is_read)
        .bind(&message.from)
        .bind(&message.to)
        .bind(&message.cc)
        .bind(&message.subject)
        .bind(message.timestamp.to_rfc3339())
        .bind(message.has_attachments)
        .bind(message.meeting.is_some())
        .bind(message.meeting.as_ref().and_then(|m| m.start.as_deref()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Store the body parts of a message, replacing any previous body.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn store_body(&self, id: MessageId, body: &BodyContent) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO bodies (message_id, body_text, body_html)
            VALUES (?, ?, ?)
            ON CONFLICT(message_id) DO UPDATE SET
                body_text = excluded.body_text,
                body_html = excluded.body_html
            ",
        )
        .bind(id.0)
        .bind(&body.text)
        .bind(&body.html)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert or replace an attachment record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn upsert_attachment(&self, attachment: &AttachmentDescriptor) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO attachments
                (id, message_id, name, size, content_type, content_id, content_location)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                message_id = excluded.message_id,
                name = excluded.name,
                size = excluded.size,
                content_type = excluded.content_type,
                content_id = excluded.content_id,
                content_location = excluded.content_location
            ",
        )
        .bind(attachment.id.0)
        .bind(attachment.message_id.0)
        .bind(&attachment.name)
        .bind(i64::try_from(attachment.size).unwrap_or(i64::MAX))
        .bind(&attachment.content_type)
        .bind(&attachment.content_id)
        .bind(&attachment.content_location)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Record where a downloaded attachment's content lives.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn set_content_location(&self, id: AttachmentId, location: &str) -> Result<()> {
        sqlx::query(r"UPDATE attachments SET content_location = ? WHERE id = ?")
            .bind(location)
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Mark a message as fully synchronized.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn mark_complete(&self, id: MessageId) -> Result<()> {
        sqlx::query(r"UPDATE messages SET completeness = ? WHERE id = ?")
            .bind(LoadCompleteness::Complete.as_str())
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// List the messages of a mailbox, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_message_ids(&self, mailbox_id: MailboxId) -> Result<Vec<MessageId>> {
        let rows = sqlx::query(
            r"
            SELECT id FROM messages
            WHERE mailbox_id = ?
            ORDER BY timestamp DESC, id DESC
            ",
        )
        .bind(mailbox_id.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| MessageId(row.get::<i64, _>("id")))
            .collect())
    }
}

fn message_from_row(row: &SqliteRow) -> Result<MessageRecord> {
    let id = MessageId(row.get::<i64, _>("id"));
    let timestamp_str: String = row.get("timestamp");
    let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
        .map_err(|e| Error::Decode(format!("message {id} timestamp {timestamp_str:?}: {e}")))?
        .with_timezone(&Utc);
    let completeness: String = row.get("completeness");
    let meeting = row
        .get::<bool, _>("meeting_invite")
        .then(|| MeetingInfo {
            start: row.get("meeting_start"),
        });

    Ok(MessageRecord {
        id,
        mailbox_id: MailboxId(row.get::<i64, _>("mailbox_id")),
        account_id: AccountId(row.get::<i64, _>("account_id")),
        completeness: LoadCompleteness::parse(&completeness),
        is_favorite: row.get::<bool, _>("is_favorite"),
        is_read: row.get::<bool, _>("is_read"),
        from: row.get("from_display"),
        to: row.get("to_display"),
        cc: row.get("cc_display"),
        subject: row.get("subject"),
        timestamp,
        has_attachments: row.get::<bool, _>("has_attachments"),
        meeting,
    })
}

fn attachment_from_row(row: &SqliteRow) -> AttachmentDescriptor {
    AttachmentDescriptor {
        id: AttachmentId(row.get::<i64, _>("id")),
        message_id: MessageId(row.get::<i64, _>("message_id")),
        name: row.get("name"),
        size: u64::try_from(row.get::<i64, _>("size")).unwrap_or(0),
        content_type: row.get("content_type"),
        content_id: row.get("content_id"),
        content_location: row.get("content_location"),
    }
}

#[async_trait]
impl ContentStore for SqliteContentStore {
    async fn load_message(&self, id: MessageId) -> Result<Option<MessageRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, mailbox_id, account_id, completeness, is_favorite, is_read,
                   from_display, to_display, cc_display, subject, timestamp,
                   has_attachments, meeting_invite, meeting_start
            FROM messages
            WHERE id = ?
            ",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(message_from_row).transpose()
    }

    async fn load_body(&self, id: MessageId) -> Result<Option<BodyContent>> {
        let row = sqlx::query(r"SELECT body_text, body_html FROM bodies WHERE message_id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| BodyContent {
            text: row.get("body_text"),
            html: row.get("body_html"),
        }))
    }

    async fn load_attachments(&self, id: MessageId) -> Result<Vec<AttachmentDescriptor>> {
        let rows = sqlx::query(
            r"
            SELECT id, message_id, name, size, content_type, content_id, content_location
            FROM attachments
            WHERE message_id = ?
            ORDER BY id
            ",
        )
        .bind(id.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(attachment_from_row).collect())
    }

    async fn load_attachment(&self, id: AttachmentId) -> Result<Option<AttachmentDescriptor>> {
        let row = sqlx::query(
            r"
            SELECT id, message_id, name, size, content_type, content_id, content_location
            FROM attachments
            WHERE id = ?
            ",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(attachment_from_row))
    }

    async fn set_read(&self, id: MessageId, is_read: bool) -> Result<()> {
        sqlx::query(r"UPDATE messages SET is_read = ? WHERE id = ?")
            .bind(is_read)
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_favorite(&self, id: MessageId, is_favorite: bool) -> Result<()> {
        sqlx::query(r"UPDATE messages SET is_favorite = ? WHERE id = ?")
            .bind(is_favorite)
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_message(&self, id: MessageId) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(r"DELETE FROM attachments WHERE message_id = ?")
            .bind(id.0)
            .execute(&mut *tx)
            .await?;

        sqlx::query(r"DELETE FROM bodies WHERE message_id = ?")
            .bind(id.0)
            .execute(&mut *tx)
            .await?;

        sqlx::query(r"DELETE FROM messages WHERE id = ?")
            .bind(id.0)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!("Deleted message {} from store", id);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: i64, hour: u32) -> MessageRecord {
        MessageRecord {
            id: MessageId(id),
            mailbox_id: MailboxId(1),
            account_id: AccountId(1),
            completeness: LoadCompleteness::Incomplete,
            is_favorite: false,
            is_read: false,
            from: "Alice <alice@example.com>".to_string(),
            to: "bob@example.com".to_string(),
            cc: String::new(),
            subject: format!("Message {id}"),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 24, hour, 0, 0).unwrap(),
            has_attachments: false,
            meeting: None,
        }
    }

    fn attachment(id: i64, message_id: i64, content_id: Option<&str>) -> AttachmentDescriptor {
        AttachmentDescriptor {
            id: AttachmentId(id),
            message_id: MessageId(message_id),
            name: format!("file{id}.png"),
            size: 2048,
            content_type: "image/png".to_string(),
            content_id: content_id.map(str::to_string),
            content_location: None,
        }
    }

    #[tokio::test]
    async fn test_store_and_load_message() {
        let store = SqliteContentStore::in_memory().await.unwrap();
        let mut message = record(1, 9);
        message.meeting = Some(MeetingInfo {
            start: Some("20260125T100000Z".to_string()),
        });
        store.upsert_message(&message).await.unwrap();

        let loaded = store.load_message(MessageId(1)).await.unwrap().unwrap();
        assert_eq!(loaded, message);
        assert!(loaded.is_meeting_invite());

        assert!(store.load_message(MessageId(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unreadable_timestamp_is_an_error() {
        let store = SqliteContentStore::in_memory().await.unwrap();
        store.upsert_message(&record(1, 9)).await.unwrap();
        sqlx::query("UPDATE messages SET timestamp = 'Tue, 1 Jan 2026' WHERE id = 1")
            .execute(&store.pool)
            .await
            .unwrap();

        let err = store.load_message(MessageId(1)).await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert!(matches!(
            crate::LoadError::from(err),
            crate::LoadError::Store(_)
        ));
    }

    #[tokio::test]
    async fn test_missing_body_is_none() {
        let store = SqliteContentStore::in_memory().await.unwrap();
        store.upsert_message(&record(1, 9)).await.unwrap();
        assert!(store.load_body(MessageId(1)).await.unwrap().is_none());

        let body = BodyContent {
            text: Some("Hello".to_string()),
            html: None,
        };
        store.store_body(MessageId(1), &body).await.unwrap();
        assert_eq!(store.load_body(MessageId(1)).await.unwrap(), Some(body));
    }

    #[tokio::test]
    async fn test_flags_and_completeness() {
        let store = SqliteContentStore::in_memory().await.unwrap();
        store.upsert_message(&record(1, 9)).await.unwrap();

        store.set_read(MessageId(1), true).await.unwrap();
        store.set_favorite(MessageId(1), true).await.unwrap();
        store.mark_complete(MessageId(1)).await.unwrap();

        let loaded = store.load_message(MessageId(1)).await.unwrap().unwrap();
        assert!(loaded.is_read);
        assert!(loaded.is_favorite);
        assert!(loaded.completeness.is_complete());
    }

    #[tokio::test]
    async fn test_attachments_and_location() {
        let store = SqliteContentStore::in_memory().await.unwrap();
        store.upsert_message(&record(1, 9)).await.unwrap();
        store
            .upsert_attachment(&attachment(10, 1, Some("img1")))
            .await
            .unwrap();
        store.upsert_attachment(&attachment(11, 1, None)).await.unwrap();

        let listed = store.load_attachments(MessageId(1)).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].content_id.as_deref(), Some("img1"));

        store
            .set_content_location(AttachmentId(10), "file:///tmp/file10.png")
            .await
            .unwrap();
        let single = store.load_attachment(AttachmentId(10)).await.unwrap().unwrap();
        assert_eq!(
            single.content_location.as_deref(),
            Some("file:///tmp/file10.png")
        );
    }

    #[tokio::test]
    async fn test_list_newest_first_and_delete() {
        let store = SqliteContentStore::in_memory().await.unwrap();
        for (id, hour) in [(1, 8), (2, 10), (3, 9)] {
            store.upsert_message(&record(id, hour)).await.unwrap();
        }
        store
            .store_body(MessageId(2), &BodyContent::default())
            .await
            .unwrap();
        store.upsert_attachment(&attachment(20, 2, None)).await.unwrap();

        let ids = store.list_message_ids(MailboxId(1)).await.unwrap();
        assert_eq!(ids, vec![MessageId(2), MessageId(3), MessageId(1)]);

        store.delete_message(MessageId(2)).await.unwrap();
        assert!(store.load_message(MessageId(2)).await.unwrap().is_none());
        assert!(store.load_body(MessageId(2)).await.unwrap().is_none());
        assert!(store.load_attachments(MessageId(2)).await.unwrap().is_empty());
        assert_eq!(
            store.list_message_ids(MailboxId(1)).await.unwrap(),
            vec![MessageId(3), MessageId(1)]
        );
    }
}
