//! Message record and identifier types.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a message in the content store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(pub i64);

/// Unique identifier for a mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MailboxId(pub i64);

/// Unique identifier for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub i64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for MailboxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How much of a message has been synchronized into the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoadCompleteness {
    /// Only headers (and maybe a partial body) are stored locally.
    #[default]
    Incomplete,
    /// The full message, body and attachment metadata are stored locally.
    Complete,
}

impl LoadCompleteness {
    /// Parse from database string representation.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "complete" => Self::Complete,
            _ => Self::Incomplete,
        }
    }

    /// Convert to database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Incomplete => "incomplete",
            Self::Complete => "complete",
        }
    }

    /// Whether the message is fully available locally.
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Meeting invitation details carried by an incoming invite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingInfo {
    /// Raw `DTSTART` value as received (e.g. `20260412T090000Z`).
    pub start: Option<String>,
}

impl MeetingInfo {
    /// Parses the meeting start time.
    ///
    /// Accepts the iCalendar UTC form (`YYYYMMDDTHHMMSSZ`) and RFC 3339.
    #[must_use]
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.start.as_deref()?.trim();
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y%m%dT%H%M%SZ") {
            return Some(naive.and_utc());
        }
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Reply to a meeting invitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeetingResponse {
    /// Will attend.
    Accepted,
    /// Might attend.
    Tentative,
    /// Will not attend.
    Declined,
}

impl MeetingResponse {
    /// Convert to the string sent to the remote service.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Tentative => "tentative",
            Self::Declined => "declined",
        }
    }
}

impl std::fmt::Display for MeetingResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a message's metadata as stored locally.
///
/// The coordinator holds an immutable copy once stage 1 completes; flag
/// changes made from the view update the copy and are written back
/// asynchronously.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Message id.
    pub id: MessageId,
    /// Mailbox containing the message.
    pub mailbox_id: MailboxId,
    /// Account owning the mailbox.
    pub account_id: AccountId,
    /// Whether the full content is available locally.
    pub completeness: LoadCompleteness,
    /// Whether the message is starred.
    pub is_favorite: bool,
    /// Whether the message has been read.
    pub is_read: bool,
    /// Sender (display form).
    pub from: String,
    /// Recipients (display form).
    pub to: String,
    /// CC recipients (display form, empty when none).
    pub cc: String,
    /// Subject line.
    pub subject: String,
    /// Message timestamp.
    pub timestamp: DateTime<Utc>,
    /// Whether the message carries attachments.
    pub has_attachments: bool,
    /// Present when the message is an incoming meeting invitation.
    pub meeting: Option<MeetingInfo>,
}

impl MessageRecord {
    /// Whether this message is an incoming meeting invitation.
    #[must_use]
    pub const fn is_meeting_invite(&self) -> bool {
        self.meeting.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_completeness_round_trip() {
        assert_eq!(LoadCompleteness::parse("complete"), LoadCompleteness::Complete);
        assert_eq!(LoadCompleteness::parse("COMPLETE"), LoadCompleteness::Complete);
        assert_eq!(LoadCompleteness::parse("partial"), LoadCompleteness::Incomplete);
        assert_eq!(LoadCompleteness::Complete.as_str(), "complete");
    }

    #[test]
    fn test_meeting_start_ical_form() {
        let info = MeetingInfo {
            start: Some("20260412T090000Z".to_string()),
        };
        assert_eq!(
            info.start_time(),
            Utc.with_ymd_and_hms(2026, 4, 12, 9, 0, 0).single()
        );
    }

    #[test]
    fn test_meeting_start_missing_or_garbage() {
        assert_eq!(MeetingInfo::default().start_time(), None);
        let info = MeetingInfo {
            start: Some("next tuesday".to_string()),
        };
        assert_eq!(info.start_time(), None);
    }
}
