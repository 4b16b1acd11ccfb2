//! Outgoing email message

use crate::domain::communication::email_addresses::EmailAddress;

/// A fully assembled email, ready for the transport.
///
/// Format selection has already happened by the time one of these exists: at
/// least one of `html` and `text` is populated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingEmail {
    /// The recipient's display name, empty when delivering to an override
    /// address
    pub to_name: String,

    /// The recipient address
    pub to_email: EmailAddress,

    /// The sender's display name
    pub from_name: String,

    /// The sender address
    pub from_email: EmailAddress,

    /// Carbon-copy addresses
    pub cc: Vec<EmailAddress>,

    /// Blind carbon-copy addresses
    pub bcc: Vec<EmailAddress>,

    /// The subject of the email
    pub subject: String,

    /// The HTML body, when the recipient's format preference calls for one
    pub html: Option<String>,

    /// The plain text body, when the recipient's format preference calls for
    /// one
    pub text: Option<String>,
}
