//! The send request model.

use crate::domain::{
    activities::ActivityId,
    batch::errors::ValidationError,
    communication::email_addresses::EmailAddress,
    contacts::{CaseId, ContactId, ContributionId, LocationTypeId},
    templates::TemplateId,
};

/// A from header: display name plus address, always both.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SenderIdentity {
    /// The sender display name
    pub name: String,

    /// The sender address
    pub email: EmailAddress,
}

/// Build the optional from header for a request.
///
/// Supplying only one of name and email is a validation error; supplying
/// neither falls back to the configured sender identity at send time.
pub fn sender_identity(
    from_name: Option<&str>,
    from_email: Option<&str>,
) -> Result<Option<SenderIdentity>, ValidationError> {
    match (from_name, from_email) {
        (Some(name), Some(email)) => Ok(Some(SenderIdentity {
            name: name.to_string(),
            email: EmailAddress::new(email)?,
        })),
        (None, None) => Ok(None),
        _ => Err(ValidationError::IncompleteFromHeader),
    }
}

/// A validated request to send one template to one or more recipients.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendEmailRequest {
    /// Recipient contact ids, processed in the supplied order
    pub recipients: Vec<ContactId>,

    /// The template to send
    pub template_id: TemplateId,

    /// Case providing extra token context; the activity is also filed on it
    pub case_id: Option<CaseId>,

    /// Contribution providing extra token context
    pub contribution_id: Option<ContributionId>,

    /// Activity providing extra token context
    pub activity_id: Option<ActivityId>,

    /// Carbon-copy addresses
    pub cc: Vec<EmailAddress>,

    /// Blind carbon-copy addresses
    pub bcc: Vec<EmailAddress>,

    /// From header override; the configured sender identity applies when
    /// absent
    pub from: Option<SenderIdentity>,

    /// Deliver every message here instead of to the recipients' own
    /// addresses, bypassing suppression checks
    pub override_address: Option<EmailAddress>,

    /// Use this location type's email instead of the primary one
    pub location_type_id: Option<LocationTypeId>,
}

impl SendEmailRequest {
    /// A minimal request for the given recipients and template.
    pub fn new(
        recipients: Vec<ContactId>,
        template_id: TemplateId,
    ) -> Result<Self, ValidationError> {
        if recipients.is_empty() {
            return Err(ValidationError::EmptyRecipients);
        }

        Ok(Self {
            recipients,
            template_id,
            case_id: None,
            contribution_id: None,
            activity_id: None,
            cc: Vec::new(),
            bcc: Vec::new(),
            from: None,
            override_address: None,
            location_type_id: None,
        })
    }

    /// Re-check the request invariants at the service boundary.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.recipients.is_empty() {
            return Err(ValidationError::EmptyRecipients);
        }

        Ok(())
    }
}
