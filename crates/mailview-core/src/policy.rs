//! Which actions are offered for a listed attachment.

use serde::{Deserialize, Serialize};

use crate::model::{AttachmentDescriptor, ListedAttachment};

/// MIME type used when nothing better is known.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Default upper bound for attachment downloads (5 MiB).
pub const DEFAULT_MAX_DOWNLOAD_SIZE: u64 = 5 * 1024 * 1024;

/// Rules deciding whether an attachment can be opened or saved.
///
/// Patterns are MIME types where either half may be `*`, e.g. `image/*`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentPolicy {
    /// Types that may be opened.
    pub view_accept: Vec<String>,
    /// Types that may never be opened, even if accepted above.
    pub view_reject: Vec<String>,
    /// Types that may be saved.
    pub download_accept: Vec<String>,
    /// Types that may never be saved, even if accepted above.
    pub download_reject: Vec<String>,
    /// Attachments larger than this are neither opened nor saved.
    pub max_download_size: u64,
}

impl Default for AttachmentPolicy {
    fn default() -> Self {
        Self {
            view_accept: vec!["*/*".to_string()],
            view_reject: Vec::new(),
            download_accept: vec!["*/*".to_string()],
            download_reject: Vec::new(),
            max_download_size: DEFAULT_MAX_DOWNLOAD_SIZE,
        }
    }
}

impl AttachmentPolicy {
    /// Decides the actions offered for `attachment`.
    #[must_use]
    pub fn classify(&self, attachment: &AttachmentDescriptor) -> ListedAttachment {
        let content_type = infer_mime_type(&attachment.name, &attachment.content_type);
        let within_size = attachment.size <= self.max_download_size;

        let can_view = within_size
            && matches_any(&content_type, &self.view_accept)
            && !matches_any(&content_type, &self.view_reject);
        let can_save = within_size
            && matches_any(&content_type, &self.download_accept)
            && !matches_any(&content_type, &self.download_reject);

        ListedAttachment {
            descriptor: attachment.clone(),
            content_type,
            can_view,
            can_save,
        }
    }
}

fn matches_any(mime_type: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|p| mime_type_matches(mime_type, p))
}

/// Whether `mime_type` matches `pattern`, ignoring case.
#[must_use]
pub fn mime_type_matches(mime_type: &str, pattern: &str) -> bool {
    let (Some((kind, sub)), Some((p_kind, p_sub))) =
        (mime_type.split_once('/'), pattern.split_once('/'))
    else {
        return mime_type.eq_ignore_ascii_case(pattern);
    };

    (p_kind == "*" || p_kind.eq_ignore_ascii_case(kind))
        && (p_sub == "*" || p_sub.eq_ignore_ascii_case(sub))
}

/// Picks the best MIME type for an attachment.
///
/// A specific stored type wins. A missing or generic one is replaced by the
/// type implied by the file extension, if known.
#[must_use]
pub fn infer_mime_type(file_name: &str, stored: &str) -> String {
    let stored = stored.trim();
    if !stored.is_empty() && !stored.eq_ignore_ascii_case(OCTET_STREAM) {
        return stored.to_lowercase();
    }

    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    let guessed = match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "txt" => "text/plain",
        "htm" | "html" => "text/html",
        "csv" => "text/csv",
        "ics" => "text/calendar",
        "eml" => "message/rfc822",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        _ => OCTET_STREAM,
    };
    guessed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AttachmentId, MessageId};

    fn descriptor(name: &str, content_type: &str, size: u64) -> AttachmentDescriptor {
        AttachmentDescriptor {
            id: AttachmentId(1),
            message_id: MessageId(1),
            name: name.to_string(),
            size,
            content_type: content_type.to_string(),
            content_id: None,
            content_location: None,
        }
    }

    #[test]
    fn test_mime_type_matches_wildcards() {
        assert!(mime_type_matches("image/png", "*/*"));
        assert!(mime_type_matches("image/png", "image/*"));
        assert!(mime_type_matches("IMAGE/PNG", "image/png"));
        assert!(!mime_type_matches("text/plain", "image/*"));
        assert!(!mime_type_matches("bogus", "image/*"));
    }

    #[test]
    fn test_infer_mime_type() {
        assert_eq!(infer_mime_type("photo.JPG", ""), "image/jpeg");
        assert_eq!(infer_mime_type("report.pdf", OCTET_STREAM), "application/pdf");
        assert_eq!(infer_mime_type("report.pdf", "Text/Plain"), "text/plain");
        assert_eq!(infer_mime_type("noext", ""), OCTET_STREAM);
    }

    #[test]
    fn test_default_policy_allows_everything_small() {
        let listed = AttachmentPolicy::default().classify(&descriptor("a.pdf", "", 10));
        assert_eq!(listed.content_type, "application/pdf");
        assert!(listed.can_view);
        assert!(listed.can_save);
    }

    #[test]
    fn test_oversized_attachments_offer_nothing() {
        let policy = AttachmentPolicy::default();
        let listed = policy.classify(&descriptor("a.pdf", "", DEFAULT_MAX_DOWNLOAD_SIZE + 1));
        assert!(!listed.can_view);
        assert!(!listed.can_save);
    }

    #[test]
    fn test_reject_list_overrides_accept() {
        let policy = AttachmentPolicy {
            view_reject: vec!["application/*".to_string()],
            ..AttachmentPolicy::default()
        };
        let listed = policy.classify(&descriptor("setup.zip", "", 10));
        assert!(!listed.can_view);
        assert!(listed.can_save);
    }
}
