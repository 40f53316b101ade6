//! Parsing of interactive commands.

use mailview_core::{AttachmentId, AttachmentIntent, MeetingResponse, MessageId, ViewCommand};

/// Help text listing the accepted commands.
pub const HELP: &str = "\
commands:
  open <id>      show message <id>
  older | newer  step through the mailbox
  fav            toggle favorite
  unread         mark unread
  delete         delete and move on
  save <id>      save attachment <id>
  view <id>      open attachment <id>
  pictures       load remote images
  accept | maybe | decline
                 reply to a meeting invitation
  pause | resume stop/restart remote notifications
  quit           close the view";

/// What a line of input asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Parsed {
    /// Forward to the view.
    Command(ViewCommand),
    /// Print [`HELP`].
    Help,
}

fn id_arg(arg: Option<&str>) -> Result<i64, String> {
    let arg = arg.ok_or_else(|| "missing id".to_string())?;
    arg.parse().map_err(|_| format!("not an id: {arg}"))
}

/// Parses one line of input.
///
/// # Errors
///
/// Returns a message describing why the line was not understood.
pub fn parse(line: &str) -> Result<Option<Parsed>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();

    let command = match verb {
        "open" => ViewCommand::Focus {
            id: MessageId(id_arg(arg)?),
            allow_remote_fetch: true,
        },
        "older" => ViewCommand::MoveOlder,
        "newer" => ViewCommand::MoveNewer,
        "fav" => ViewCommand::ToggleFavorite,
        "unread" => ViewCommand::MarkUnread,
        "delete" => ViewCommand::Delete,
        "save" | "view" => ViewCommand::AttachmentAction {
            id: AttachmentId(id_arg(arg)?),
            intent: if verb == "save" {
                AttachmentIntent::Save
            } else {
                AttachmentIntent::Open
            },
        },
        "pictures" => ViewCommand::ShowPictures,
        "accept" => ViewCommand::RespondToInvite(MeetingResponse::Accepted),
        "maybe" => ViewCommand::RespondToInvite(MeetingResponse::Tentative),
        "decline" => ViewCommand::RespondToInvite(MeetingResponse::Declined),
        "pause" => ViewCommand::Pause,
        "resume" => ViewCommand::Resume,
        "quit" | "exit" => ViewCommand::Close,
        "help" | "?" => return Ok(Some(Parsed::Help)),
        other => return Err(format!("unknown command: {other}")),
    };
    Ok(Some(Parsed::Command(command)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("   ").unwrap(), None);
        assert_eq!(
            parse("open 3").unwrap(),
            Some(Parsed::Command(ViewCommand::Focus {
                id: MessageId(3),
                allow_remote_fetch: true,
            }))
        );
        assert_eq!(
            parse("save 101").unwrap(),
            Some(Parsed::Command(ViewCommand::AttachmentAction {
                id: AttachmentId(101),
                intent: AttachmentIntent::Save,
            }))
        );
        assert_eq!(
            parse("maybe").unwrap(),
            Some(Parsed::Command(ViewCommand::RespondToInvite(
                MeetingResponse::Tentative
            )))
        );
        assert_eq!(parse("help").unwrap(), Some(Parsed::Help));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("open").unwrap_err(), "missing id");
        assert_eq!(parse("view x").unwrap_err(), "not an id: x");
        assert!(parse("frobnicate").is_err());
    }
}
