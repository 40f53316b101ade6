//! Terminal rendering of view events.

use mailview_core::render::html_to_text;
use mailview_core::{ProgressKind, TransientErrorKind, ViewEvent};

fn notice(kind: TransientErrorKind) -> &'static str {
    match kind {
        TransientErrorKind::RemoteFetchFailed => "Could not load the full message",
        TransientErrorKind::AttachmentFetchFailed => "Could not download the attachment",
        TransientErrorKind::BodyLoadFailed => "Could not read the message body",
        TransientErrorKind::AttachmentsLoadFailed => "Could not read the attachment list",
        TransientErrorKind::NoStorage => "No storage available for saving",
        TransientErrorKind::AttachmentNotSaved => "Attachment could not be saved",
        TransientErrorKind::AttachmentNotOpened => "Attachment could not be opened",
    }
}

/// One line (or block) of output for `event`, or `None` for events with
/// nothing to show.
pub fn describe(event: &ViewEvent) -> Option<String> {
    let line = match event {
        ViewEvent::Reset => "----------------------------------------".to_string(),
        ViewEvent::MetadataReady(message) => {
            let mut header = format!(
                "From:    {}\nTo:      {}\nSubject: {}\nDate:    {}",
                message.from,
                message.to,
                message.subject,
                message.timestamp.format("%Y-%m-%d %H:%M")
            );
            if !message.cc.is_empty() {
                header.push_str(&format!("\nCc:      {}", message.cc));
            }
            if let Some(start) = message.meeting.as_ref().and_then(|m| m.start_time()) {
                header.push_str(&format!("\nMeeting: {}", start.format("%Y-%m-%d %H:%M UTC")));
            }
            if message.is_favorite {
                header.push_str("\n[favorite]");
            }
            header
        }
        ViewEvent::PlaceholderBody(uri) => format!("[{uri}]"),
        ViewEvent::BodyReady { html, has_images } => {
            let text = html_to_text(html).unwrap_or_else(|| html.clone());
            if *has_images {
                format!("{text}\n(contains images, type `pictures` to load them)")
            } else {
                text
            }
        }
        ViewEvent::PicturesShown { html } => {
            html_to_text(html).unwrap_or_else(|| html.clone())
        }
        ViewEvent::InviteResponseSent(response) => format!("Replied {response} to the invitation"),
        ViewEvent::AttachmentAvailable(attachment) => format!(
            "  #{} {} ({}, {} bytes){}{}",
            attachment.descriptor.id,
            attachment.descriptor.name,
            attachment.content_type,
            attachment.descriptor.size,
            if attachment.can_view { " [view]" } else { "" },
            if attachment.can_save { " [save]" } else { "" },
        ),
        ViewEvent::AttachmentSaved { path } => format!("Saved to {}", path.display()),
        ViewEvent::AttachmentOpened(id) => format!("Opened attachment #{id}"),
        ViewEvent::Progress(ProgressKind::RemoteFetch, true) => "Loading message...".to_string(),
        ViewEvent::Progress(ProgressKind::AttachmentFetch { name }, true) => {
            format!("Downloading {name}...")
        }
        ViewEvent::TransientError(kind) => format!("! {}", notice(*kind)),
        ViewEvent::NavigationChanged {
            can_move_older,
            can_move_newer,
        } => format!(
            "[{}older] [{}newer]",
            if *can_move_older { "" } else { "no " },
            if *can_move_newer { "" } else { "no " },
        ),
        ViewEvent::FavoriteChanged(on) => {
            if *on { "Starred" } else { "Unstarred" }.to_string()
        }
        ViewEvent::MessageDeleted(id) => format!("Deleted message {id}"),
        ViewEvent::AbandonView => "Nothing left to show.".to_string(),
        ViewEvent::Progress(_, false)
        | ViewEvent::AttachmentListChanged
        | ViewEvent::AttachmentThumbnailUpdated(_)
        | ViewEvent::AttachmentControlsEnabled(_) => return None,
    };
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailview_core::{MeetingResponse, MessageId};

    #[test]
    fn test_silent_events() {
        assert_eq!(describe(&ViewEvent::AttachmentListChanged), None);
        assert_eq!(
            describe(&ViewEvent::Progress(ProgressKind::RemoteFetch, false)),
            None
        );
    }

    #[test]
    fn test_navigation_line() {
        let line = describe(&ViewEvent::NavigationChanged {
            can_move_older: true,
            can_move_newer: false,
        });
        assert_eq!(line.as_deref(), Some("[older] [no newer]"));
        assert_eq!(
            describe(&ViewEvent::MessageDeleted(MessageId(4))).as_deref(),
            Some("Deleted message 4")
        );
        assert_eq!(
            describe(&ViewEvent::InviteResponseSent(MeetingResponse::Declined)).as_deref(),
            Some("Replied declined to the invitation")
        );
    }
}
