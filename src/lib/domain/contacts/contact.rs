//! Contact model and the recipient filter.

use std::collections::HashMap;
use std::fmt;

use crate::domain::{communication::email_addresses::EmailAddress, contacts::ContactId};

/// Per-contact mail format preference, governing which body parts are sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MailFormat {
    /// HTML body only
    Html,

    /// Plain text body only
    Text,

    /// Both body parts
    #[default]
    Both,
}

impl MailFormat {
    /// Parse a stored preference label, defaulting to [`MailFormat::Both`]
    /// for anything unrecognised.
    pub fn from_label(label: &str) -> Self {
        match label {
            "HTML" => Self::Html,
            "Text" => Self::Text,
            _ => Self::Both,
        }
    }
}

/// A contact as resolved from the directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Contact {
    /// The contact's identifier
    pub id: ContactId,

    /// The contact's display name
    pub display_name: String,

    /// The resolved email address, already honouring any requested location
    /// type
    pub email: Option<EmailAddress>,

    /// The contact opted out of email
    pub do_not_email: bool,

    /// The contact is recorded as deceased
    pub is_deceased: bool,

    /// The resolved email address is on hold
    pub on_hold: bool,

    /// Which body parts the contact prefers to receive
    pub preferred_mail_format: MailFormat,

    /// Rendered email greeting, substituted last during token rendering
    pub email_greeting: Option<String>,

    /// Rendered postal greeting
    pub postal_greeting: Option<String>,

    /// Rendered addressee line
    pub addressee: Option<String>,

    /// Flat attribute map used for token substitution. Component values
    /// (event, membership, ...) are embedded here under dotted keys.
    pub attributes: HashMap<String, String>,
}

/// Where a message for one recipient should actually be delivered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryTarget {
    /// The recipient display name, empty for override deliveries
    pub name: String,

    /// The destination address
    pub email: EmailAddress,
}

/// Why a recipient was silently suppressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The contact has no email address
    NoEmailAddress,

    /// The contact opted out of email
    DoNotEmail,

    /// The contact is deceased
    Deceased,

    /// The contact's email address is on hold
    OnHold,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NoEmailAddress => "no email address",
            Self::DoNotEmail => "opted out of email",
            Self::Deceased => "deceased",
            Self::OnHold => "email on hold",
        };

        write!(f, "{reason}")
    }
}

impl Contact {
    /// Decide where to deliver for this contact, or why to skip them.
    ///
    /// An override address always wins over the suppression checks; the
    /// checks only run when delivering to the contact's own address.
    pub fn delivery_target(
        &self,
        override_address: Option<&EmailAddress>,
    ) -> Result<DeliveryTarget, SkipReason> {
        if let Some(address) = override_address {
            return Ok(DeliveryTarget {
                name: String::new(),
                email: address.clone(),
            });
        }

        if self.do_not_email {
            return Err(SkipReason::DoNotEmail);
        }

        if self.is_deceased {
            return Err(SkipReason::Deceased);
        }

        let email = self.email.as_ref().ok_or(SkipReason::NoEmailAddress)?;

        if self.on_hold {
            return Err(SkipReason::OnHold);
        }

        Ok(DeliveryTarget {
            name: self.display_name.clone(),
            email: email.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eligible_contact() -> Contact {
        Contact {
            id: 7,
            display_name: "Ana Pereira".to_string(),
            email: Some(EmailAddress::new_unchecked("ana@example.com")),
            ..Contact::default()
        }
    }

    #[test]
    fn test_delivery_target_uses_contact_email_and_name() {
        let target = eligible_contact().delivery_target(None).unwrap();

        assert_eq!(target.name, "Ana Pereira");
        assert_eq!(target.email.as_str(), "ana@example.com");
    }

    #[test]
    fn test_override_address_wins_over_suppression() {
        let contact = Contact {
            do_not_email: true,
            is_deceased: true,
            ..eligible_contact()
        };

        let override_address = EmailAddress::new_unchecked("audit@example.org");
        let target = contact.delivery_target(Some(&override_address)).unwrap();

        assert_eq!(target.name, "");
        assert_eq!(target.email, override_address);
    }

    #[test]
    fn test_do_not_email_is_skipped() {
        let contact = Contact {
            do_not_email: true,
            ..eligible_contact()
        };

        assert_eq!(contact.delivery_target(None), Err(SkipReason::DoNotEmail));
    }

    #[test]
    fn test_missing_email_is_skipped() {
        let contact = Contact {
            email: None,
            ..eligible_contact()
        };

        assert_eq!(
            contact.delivery_target(None),
            Err(SkipReason::NoEmailAddress)
        );
    }

    #[test]
    fn test_on_hold_is_skipped() {
        let contact = Contact {
            on_hold: true,
            ..eligible_contact()
        };

        assert_eq!(contact.delivery_target(None), Err(SkipReason::OnHold));
    }

    #[test]
    fn test_mail_format_labels() {
        assert_eq!(MailFormat::from_label("HTML"), MailFormat::Html);
        assert_eq!(MailFormat::from_label("Text"), MailFormat::Text);
        assert_eq!(MailFormat::from_label("Both"), MailFormat::Both);
        assert_eq!(MailFormat::from_label(""), MailFormat::Both);
    }
}
