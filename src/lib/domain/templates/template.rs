//! Template model and resolution.

use lazy_static::lazy_static;
use regex::Regex;

use crate::domain::templates::{errors::ResolveTemplateError, TemplateId};

lazy_static! {
    static ref LINE_BREAK_TAGS: Regex =
        Regex::new(r"(?i)<br\s*/?>|</p>|</div>|</tr>|</li>|</h[1-6]>").unwrap();
    static ref LIST_ITEM_TAGS: Regex = Regex::new(r"(?i)<li[^>]*>").unwrap();
    static ref ANY_TAG: Regex = Regex::new(r"(?s)<[^>]+>").unwrap();
    static ref EXCESS_BLANK_LINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

/// A message template as stored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageTemplate {
    /// The template's identifier
    pub id: TemplateId,

    /// The template's title, shown in pickers
    pub title: String,

    /// The subject line, may contain tokens
    pub subject: String,

    /// The HTML body, may contain tokens
    pub html: Option<String>,

    /// The plain text body, may contain tokens
    pub text: Option<String>,
}

/// A template ready for rendering: the text body is guaranteed present,
/// derived from the HTML body when the stored template has none.
///
/// Immutable once resolved; shared read-only across all recipients of a
/// batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedTemplate {
    /// The template's identifier
    pub id: TemplateId,

    /// The subject line
    pub subject: String,

    /// The HTML body, if the stored template has one
    pub html: Option<String>,

    /// The plain text body
    pub text: String,
}

impl MessageTemplate {
    /// Resolve this template for sending.
    ///
    /// A template with neither body is rejected; a missing or empty text
    /// body defaults to a plain-text rendering of the HTML body.
    pub fn resolve(self) -> Result<ResolvedTemplate, ResolveTemplateError> {
        let html = self.html.filter(|body| !body.trim().is_empty());
        let text = self.text.filter(|body| !body.trim().is_empty());

        let text = match (text, &html) {
            (Some(text), _) => text,
            (None, Some(html)) => html_to_text(html),
            (None, None) => return Err(ResolveTemplateError::EmptyTemplate(self.id)),
        };

        Ok(ResolvedTemplate {
            id: self.id,
            subject: self.subject,
            html,
            text,
        })
    }
}

/// Derive a plain-text rendering from an HTML body.
///
/// Block-level closing tags become line breaks, list items become dashes,
/// remaining tags are stripped and common entities decoded.
pub fn html_to_text(html: &str) -> String {
    let text = LIST_ITEM_TAGS.replace_all(html, "- ");
    let text = LINE_BREAK_TAGS.replace_all(&text, "\n");
    let text = ANY_TAG.replace_all(&text, "");

    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    EXCESS_BLANK_LINES
        .replace_all(&text, "\n\n")
        .trim()
        .to_string()
}
