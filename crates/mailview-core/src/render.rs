//! Conversions between plain-text and HTML bodies.

use std::sync::LazyLock;

use regex::Regex;

/// Web URLs, with or without a scheme.
static WEB_URL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:https?://)?(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z]{2,}(?::\d{1,5})?(?:/[^\s<>]*)?",
    )
    .ok()
});

/// Start of an `<img` tag.
static IMG_TAG_START: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)<img\s+").ok());

/// Leading `http://` or `https://`, any case.
static WEB_URL_SCHEME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").ok());

/// Escapes text for display inside HTML. Line breaks become `<br>`.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("<br>");
            }
            '\n' => out.push_str("<br>"),
            _ => out.push(c),
        }
    }
    out
}

/// Wraps web URLs in anchors.
///
/// A match directly preceded by `@` is the domain of an email address and is
/// left alone. Schemes are lower-cased; scheme-less URLs get `http://`.
#[must_use]
pub fn linkify(escaped: &str) -> String {
    let Some(re) = WEB_URL.as_ref() else {
        return escaped.to_string();
    };

    let mut out = String::with_capacity(escaped.len());
    let mut last = 0;
    for m in re.find_iter(escaped) {
        out.push_str(&escaped[last..m.start()]);
        let url = m.as_str();
        if escaped[..m.start()].ends_with('@') {
            out.push_str(url);
        } else {
            out.push_str(&format!("<a href=\"{}\">{url}</a>", link_target(url)));
        }
        last = m.end();
    }
    out.push_str(&escaped[last..]);
    out
}

fn link_target(url: &str) -> String {
    match WEB_URL_SCHEME.as_ref().and_then(|re| re.find(url)) {
        Some(scheme) => format!(
            "{}{}",
            scheme.as_str().to_lowercase(),
            &url[scheme.end()..]
        ),
        None => format!("http://{url}"),
    }
}

/// Builds a displayable HTML document from a plain-text body.
#[must_use]
pub fn text_to_html(text: Option<&str>) -> String {
    let inner = text.map(|t| linkify(&escape_html(t))).unwrap_or_default();
    format!("<html><body>{inner}</body></html>")
}

/// Derives a plain-text form of an HTML body.
#[must_use]
pub fn html_to_text(html: &str) -> Option<String> {
    match htmd::convert(html) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::debug!("HTML to text conversion failed: {}", e);
            None
        }
    }
}

/// Whether the HTML contains an image tag.
#[must_use]
pub fn has_images(html: &str) -> bool {
    IMG_TAG_START.as_ref().is_some_and(|re| re.is_match(html))
}
