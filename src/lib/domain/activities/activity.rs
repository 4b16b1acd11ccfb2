//! Activity model.

use chrono::{DateTime, Utc};

use crate::domain::contacts::ContactId;

/// Activity type recorded for every sent email.
pub const ACTIVITY_TYPE_EMAIL: &str = "Email";

/// Status recorded for every sent email.
pub const ACTIVITY_STATUS_COMPLETED: &str = "Completed";

/// An audit record for one sent email, not yet persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewActivity {
    /// The contact the send was attributed to
    pub source_contact_id: ContactId,

    /// The contact marked as the activity's target
    pub target_contact_id: ContactId,

    /// The rendered subject
    pub subject: String,

    /// The combined message body, see [`combine_details`]
    pub details: String,

    /// When the email was sent
    pub date_time: DateTime<Utc>,
}

impl NewActivity {
    /// Build the audit record for an email sent to `contact_id` now.
    pub fn email_sent(contact_id: ContactId, subject: &str, details: String) -> Self {
        Self {
            source_contact_id: contact_id,
            target_contact_id: contact_id,
            subject: subject.to_string(),
            details,
            date_time: Utc::now(),
        }
    }
}

/// Combine the rendered body parts into the stored details field.
///
/// When both parts exist, both representations are preserved between literal
/// alternative-item markers; otherwise whichever exists is stored as-is.
pub fn combine_details(html: Option<&str>, text: Option<&str>) -> String {
    match (html, text) {
        (Some(html), Some(text)) => {
            format!("-ALTERNATIVE ITEM 0-\n{html}\n-ALTERNATIVE ITEM 1-\n{text}\n-ALTERNATIVE END-\n")
        }
        (Some(html), None) => html.to_string(),
        (None, Some(text)) => text.to_string(),
        (None, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_details_with_both_parts() {
        let details = combine_details(Some("<p>Hello</p>"), Some("Hello"));

        assert_eq!(
            details,
            "-ALTERNATIVE ITEM 0-\n<p>Hello</p>\n-ALTERNATIVE ITEM 1-\nHello\n-ALTERNATIVE END-\n"
        );
    }

    #[test]
    fn test_combine_details_with_single_part() {
        assert_eq!(combine_details(None, Some("Hello")), "Hello");
        assert_eq!(combine_details(Some("<p>Hello</p>"), None), "<p>Hello</p>");
    }
}
