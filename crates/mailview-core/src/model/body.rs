//! Message body content.

use serde::{Deserialize, Serialize};

use crate::render;

/// Body parts of a message as stored.
///
/// Produced once per focused message and replaced wholesale on each reload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyContent {
    /// Plain text part.
    pub text: Option<String>,
    /// HTML part.
    pub html: Option<String>,
}

/// Body ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBody {
    /// HTML to display.
    pub html: String,
    /// Plain text part as stored.
    pub plain: Option<String>,
    /// Whether the stored body was HTML (and therefore eligible for
    /// inline-image substitution).
    pub is_html: bool,
    /// Whether the HTML references images.
    pub has_images: bool,
}

impl BodyContent {
    /// Builds the displayable form of this body.
    ///
    /// HTML wins when present. Otherwise
    /// the text part is escaped, URLs are linkified, and it is wrapped in a
    /// minimal document.
    #[must_use]
    pub fn render(&self) -> RenderedBody {
        if let Some(html) = &self.html {
            return RenderedBody {
                html: html.clone(),
                plain: self.text.clone(),
                is_html: true,
                has_images: render::has_images(html),
            };
        }

        RenderedBody {
            html: render::text_to_html(self.text.as_deref()),
            plain: self.text.clone(),
            is_html: false,
            has_images: false,
        }
    }
}

impl RenderedBody {
    /// Plain text form of the body.
    ///
    /// Converted from the HTML on each call, falling back to the stored text
    /// part when conversion fails.
    #[must_use]
    pub fn text(&self) -> String {
        let converted = if self.is_html {
            render::html_to_text(&self.html)
        } else {
            None
        };
        converted
            .or_else(|| self.plain.clone())
            .unwrap_or_default()
    }
}
