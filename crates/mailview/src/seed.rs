//! Demo mailbox contents for a fresh database.

use std::path::Path;

use chrono::{Duration, Utc};
use mailview_core::{
    AccountId, AttachmentDescriptor, AttachmentId, BodyContent, LoadCompleteness, MailboxId,
    MeetingInfo, MessageId, MessageRecord, SqliteContentStore,
};

/// Mailbox the demo messages live in.
pub const DEMO_MAILBOX: MailboxId = MailboxId(1);

const LOGO_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16"><rect width="16" height="16" fill="teal"/></svg>"#;

fn message(id: i64, hours_ago: i64, subject: &str, completeness: LoadCompleteness) -> MessageRecord {
    MessageRecord {
        id: MessageId(id),
        mailbox_id: DEMO_MAILBOX,
        account_id: AccountId(1),
        completeness,
        is_favorite: false,
        is_read: false,
        from: "Dana Reyes <dana@example.com>".to_string(),
        to: "you@example.com".to_string(),
        cc: String::new(),
        subject: subject.to_string(),
        timestamp: Utc::now() - Duration::hours(hours_ago),
        has_attachments: false,
        meeting: None,
    }
}

/// Fills an empty mailbox with a handful of messages covering each load path.
///
/// # Errors
///
/// Returns an error if the store or the cache directory cannot be written.
pub async fn seed_demo(store: &SqliteContentStore, cache_dir: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(cache_dir).await?;
    let logo = cache_dir.join("logo.svg");
    tokio::fs::write(&logo, LOGO_SVG).await?;

    let mut newsletter = message(1, 1, "Quarterly update", LoadCompleteness::Complete);
    newsletter.has_attachments = true;
    store.upsert_message(&newsletter).await?;
    store
        .store_body(
            newsletter.id,
            &BodyContent {
                text: None,
                html: Some(
                    r#"<html><body><img src="cid:logo@example.com"><p>Numbers are up.</p></body></html>"#
                        .to_string(),
                ),
            },
        )
        .await?;
    store
        .upsert_attachment(&AttachmentDescriptor {
            id: AttachmentId(100),
            message_id: newsletter.id,
            name: "logo.svg".to_string(),
            size: 120,
            content_type: "image/svg+xml".to_string(),
            content_id: Some("logo@example.com".to_string()),
            content_location: Some(format!("file://{}", logo.display())),
        })
        .await?;
    store
        .upsert_attachment(&AttachmentDescriptor {
            id: AttachmentId(101),
            message_id: newsletter.id,
            name: "report.pdf".to_string(),
            size: 48_000,
            content_type: "application/octet-stream".to_string(),
            content_id: None,
            content_location: None,
        })
        .await?;

    let partial = message(2, 3, "Trip photos", LoadCompleteness::Incomplete);
    store.upsert_message(&partial).await?;
    store
        .store_body(
            partial.id,
            &BodyContent {
                text: Some("Photos are at www.example.com/trip, enjoy!".to_string()),
                html: None,
            },
        )
        .await?;

    let mut invite = message(3, 5, "Planning sync", LoadCompleteness::Complete);
    invite.is_read = true;
    invite.meeting = Some(MeetingInfo {
        start: Some((Utc::now() + Duration::days(1)).format("%Y%m%dT090000Z").to_string()),
    });
    store.upsert_message(&invite).await?;
    store
        .store_body(
            invite.id,
            &BodyContent {
                text: Some("Agenda: roadmap & staffing <draft>".to_string()),
                html: None,
            },
        )
        .await?;

    tracing::info!("Seeded demo mailbox {}", DEMO_MAILBOX);
    Ok(())
}
