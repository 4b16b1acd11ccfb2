//! Per-recipient rendering context and output.

use std::collections::HashMap;

use crate::domain::contacts::Contact;

/// Everything token rendering may draw on for one recipient.
///
/// Built fresh per recipient and discarded after the send; the linked entity
/// maps are only present when the request supplied the matching id and the
/// lookup succeeded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecipientContext {
    /// The resolved contact
    pub contact: Contact,

    /// Case attributes, when a case id was supplied
    pub case: Option<HashMap<String, String>>,

    /// Contribution attributes, when a contribution id was supplied
    pub contribution: Option<HashMap<String, String>>,

    /// Activity attributes, when an activity id was supplied
    pub activity: Option<HashMap<String, String>>,
}

impl RecipientContext {
    /// A context carrying only contact data.
    pub fn for_contact(contact: Contact) -> Self {
        Self {
            contact,
            ..Self::default()
        }
    }
}

/// The rendered message for one recipient. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedMessage {
    /// The rendered subject
    pub subject: String,

    /// The rendered HTML body, when the template has one
    pub html: Option<String>,

    /// The rendered text body; template resolution guarantees one exists
    pub text: String,
}
