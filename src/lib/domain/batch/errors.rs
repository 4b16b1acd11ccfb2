//! Error types for batch sending

use thiserror::Error;

use crate::domain::{
    activities::errors::RecordActivityError,
    communication::{email_addresses::EmailAddressError, mailer::MailerError},
    contacts::{errors::DirectoryError, ContactId},
    templates::errors::{GetTemplateError, ResolveTemplateError},
};

/// Errors detected before any recipient is processed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The recipient list is empty
    #[error("At least one recipient contact id is required")]
    EmptyRecipients,

    /// Only one of from-name and from-email was supplied
    #[error("You have to provide both from_name and from_email")]
    IncompleteFromHeader,

    /// An address in the request did not parse
    #[error(transparent)]
    InvalidAddress(#[from] EmailAddressError),
}

/// Errors that can abort a batch send
#[derive(Debug, Error)]
pub enum SendBatchError {
    /// The request failed validation; nothing was processed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The template could not be found
    #[error(transparent)]
    Template(#[from] GetTemplateError),

    /// The template could not be resolved for sending
    #[error(transparent)]
    EmptyTemplate(#[from] ResolveTemplateError),

    /// A recipient could not be resolved from the directory
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// The transport rejected one recipient's message; later recipients were
    /// not attempted
    #[error("Error sending e-mail to {to} (contact {contact_id})")]
    Delivery {
        /// The recipient whose message was rejected
        contact_id: ContactId,

        /// The address the delivery was attempted to
        to: String,

        /// The underlying transport failure
        #[source]
        source: MailerError,
    },

    /// The email was sent but its audit record could not be written
    #[error("E-mail to contact {contact_id} was sent but could not be recorded")]
    AuditWrite {
        /// The recipient whose activity write failed
        contact_id: ContactId,

        /// The underlying write failure
        #[source]
        source: RecordActivityError,
    },

    /// The request did not finish within the configured deadline
    #[error("The send request did not complete within the configured deadline")]
    DeadlineExceeded,
}
