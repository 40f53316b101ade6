//! Inline image substitution.
//!
//! HTML bodies reference embedded images as `src="cid:<content-id>"`. Once the
//! attachments of a message are known, those references are rewritten to the
//! location the attachment content can be read from. Attachments that are not
//! referenced this way are listed for the user instead.

use regex::{Captures, Regex};

use crate::model::{AttachmentDescriptor, AttachmentId};

/// Result of partitioning a message's attachments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineOutcome {
    /// HTML with every matched reference rewritten. `None` when there was no
    /// HTML to work on.
    pub html: Option<String>,
    /// Whether any reference was rewritten.
    pub changed: bool,
    /// Attachments consumed by substitution.
    pub inline: Vec<AttachmentId>,
    /// Attachments to offer to the user.
    pub listed: Vec<AttachmentDescriptor>,
}

/// Rewrites `cid:` references in `raw_html` and partitions `attachments`.
///
/// A reference is a quoted attribute value `cid:<id>` (`src="cid:<id>"`); the scheme matches in
/// any case, the id must match exactly. An attachment is inline only when it
/// has a content id, a content location, and at least one reference in the
/// HTML. Every other attachment is listed. Always pass the pristine stored
/// HTML, never a previous output, so that repeated calls agree.
#[must_use]
pub fn substitute_inline_images(
    raw_html: Option<&str>,
    attachments: &[AttachmentDescriptor],
) -> InlineOutcome {
    let mut outcome = InlineOutcome {
        html: raw_html.map(str::to_string),
        ..InlineOutcome::default()
    };

    for attachment in attachments {
        let substituted = match (
            outcome.html.as_deref(),
            attachment.content_id.as_deref(),
            attachment.content_location.as_deref(),
        ) {
            (Some(html), Some(content_id), Some(location)) => {
                replace_reference(html, content_id, location)
            }
            _ => None,
        };

        match substituted {
            Some(html) => {
                tracing::trace!(attachment = %attachment.id, "Inline image substituted");
                outcome.html = Some(html);
                outcome.changed = true;
                outcome.inline.push(attachment.id);
            }
            None => outcome.listed.push(attachment.clone()),
        }
    }

    outcome
}

/// Replaces every reference to `content_id`, or returns `None` if there is none.
///
/// Only attribute values count (`src="cid:..."`); quoted text elsewhere in the
/// document is left alone.
fn replace_reference(html: &str, content_id: &str, location: &str) -> Option<String> {
    let id = regex::escape(content_id);
    let pattern = format!(
        r#"(?P<attr>\s(?i:[a-z][a-z0-9_:-]*)\s*=\s*)(?:"(?i:cid):{id}"|(?P<single>'(?i:cid):{id}'))"#
    );
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            tracing::warn!("Invalid content-id pattern for {:?}: {}", content_id, e);
            return None;
        }
    };

    if !re.is_match(html) {
        return None;
    }

    let replaced = re.replace_all(html, |caps: &Captures<'_>| {
        let location = if caps.name("single").is_some() {
            format!("'{}'", location.replace('\'', "%27"))
        } else {
            format!("\"{}\"", location.replace('"', "%22"))
        };
        format!("{}{location}", &caps["attr"])
    });
    Some(replaced.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MessageId;
    use proptest::prelude::*;

    fn attachment(id: i64, content_id: Option<&str>, location: Option<&str>) -> AttachmentDescriptor {
        AttachmentDescriptor {
            id: AttachmentId(id),
            message_id: MessageId(1),
            name: format!("file{id}.png"),
            size: 1024,
            content_type: "image/png".to_string(),
            content_id: content_id.map(str::to_string),
            content_location: location.map(str::to_string),
        }
    }

    #[test]
    fn test_substitutes_referenced_image() {
        let html = r#"<p><img src="cid:img1"></p>"#;
        let attachments = [attachment(7, Some("img1"), Some("content://att/7"))];

        let outcome = substitute_inline_images(Some(html), &attachments);

        assert_eq!(
            outcome.html.as_deref(),
            Some(r#"<p><img src="content://att/7"></p>"#)
        );
        assert!(outcome.changed);
        assert_eq!(outcome.inline, vec![AttachmentId(7)]);
        assert!(outcome.listed.is_empty());
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        let html = r#"<img SRC="CID:img1"><img src='Cid:img1'>"#;
        let attachments = [attachment(7, Some("img1"), Some("loc"))];

        let outcome = substitute_inline_images(Some(html), &attachments);

        assert_eq!(outcome.html.as_deref(), Some(r#"<img SRC="loc"><img src='loc'>"#));
    }

    #[test]
    fn test_id_is_case_sensitive() {
        let html = r#"<img src="cid:IMG1">"#;
        let attachments = [attachment(7, Some("img1"), Some("loc"))];

        let outcome = substitute_inline_images(Some(html), &attachments);

        assert!(!outcome.changed);
        assert_eq!(outcome.html.as_deref(), Some(html));
        assert_eq!(outcome.listed.len(), 1);
    }

    #[test]
    fn test_no_partial_id_matches() {
        let html = r#"<img src="cid:img10">"#;
        let attachments = [attachment(7, Some("img1"), Some("loc"))];

        let outcome = substitute_inline_images(Some(html), &attachments);

        assert!(!outcome.changed);
        assert_eq!(outcome.listed[0].id, AttachmentId(7));
    }

    #[test]
    fn test_regex_metacharacters_in_id() {
        let html = r#"<img src="cid:part1.06090408@example.com">"#;
        let attachments = [
            attachment(1, Some("part1x06090408@example.com"), Some("wrong")),
            attachment(2, Some("part1.06090408@example.com"), Some("right")),
        ];

        let outcome = substitute_inline_images(Some(html), &attachments);

        assert_eq!(outcome.html.as_deref(), Some(r#"<img src="right">"#));
        assert_eq!(outcome.inline, vec![AttachmentId(2)]);
        assert_eq!(outcome.listed[0].id, AttachmentId(1));
    }

    #[test]
    fn test_unreferenced_and_plain_attachments_are_listed() {
        let html = "<p>no images</p>";
        let attachments = [
            attachment(1, Some("img1"), Some("loc")),
            attachment(2, None, Some("loc2")),
            attachment(3, Some("img3"), None),
        ];

        let outcome = substitute_inline_images(Some(html), &attachments);

        assert!(outcome.inline.is_empty());
        assert_eq!(outcome.listed.len(), 3);
    }

    #[test]
    fn test_text_bodies_list_everything() {
        let attachments = [attachment(1, Some("img1"), Some("loc"))];

        let outcome = substitute_inline_images(None, &attachments);

        assert_eq!(outcome.html, None);
        assert_eq!(outcome.listed.len(), 1);
    }

    #[test]
    fn test_quoted_text_is_not_a_reference() {
        let html = r#"<p>type "cid:img1" to embed</p>"#;
        let attachments = [attachment(7, Some("img1"), Some("loc"))];

        let outcome = substitute_inline_images(Some(html), &attachments);

        assert!(!outcome.changed);
        assert_eq!(outcome.html.as_deref(), Some(html));
        assert!(outcome.inline.is_empty());
        assert_eq!(outcome.listed[0].id, AttachmentId(7));
    }

    #[test]
    fn test_attribute_spacing_is_kept() {
        let html = "<img\n  src = 'cid:img1'><p>\"cid:img1\"</p>";
        let attachments = [attachment(7, Some("img1"), Some("loc"))];

        let outcome = substitute_inline_images(Some(html), &attachments);

        assert_eq!(
            outcome.html.as_deref(),
            Some("<img\n  src = 'loc'><p>\"cid:img1\"</p>")
        );
        assert_eq!(outcome.inline, vec![AttachmentId(7)]);
    }

    #[test]
    fn test_location_quotes_are_encoded() {
        let html = r#"<img src="cid:a">"#;
        let attachments = [attachment(1, Some("a"), Some(r#"x"y"#))];

        let outcome = substitute_inline_images(Some(html), &attachments);

        assert_eq!(outcome.html.as_deref(), Some(r#"<img src="x%22y">"#));
    }

    proptest! {
        #[test]
        fn prop_substitution_is_idempotent(
            ids in proptest::collection::vec("[a-z0-9]{1,6}", 0..4),
            referenced in proptest::collection::vec(any::<bool>(), 4),
        ) {
            let html: String = ids
                .iter()
                .zip(&referenced)
                .map(|(id, r)| if *r { format!("<img src=\"cid:{id}\">") } else { "<p>x</p>".to_string() })
                .collect();
            let attachments: Vec<_> = ids
                .iter()
                .enumerate()
                .map(|(i, id)| attachment(i64::try_from(i).unwrap_or_default(), Some(id), Some("loc")))
                .collect();

            let once = substitute_inline_images(Some(&html), &attachments);
            let twice = substitute_inline_images(Some(&html), &attachments);
            prop_assert_eq!(&once, &twice);

            for item in &once.listed {
                prop_assert!(!once.inline.contains(&item.id));
            }
            prop_assert_eq!(once.inline.len() + once.listed.len(), attachments.len());
        }
    }
}
