//! Mailer errors

use thiserror::Error;

/// Mailer errors
#[derive(Debug, Error)]
pub enum MailerError {
    /// The transport rejected the message
    #[error("The mail transport rejected the message")]
    SendError,

    /// A header address could not be parsed by the transport
    #[error("Invalid email address in message headers")]
    InvalidEmail,

    /// The message has neither an HTML nor a text body
    #[error("The message has no body")]
    EmptyBody,

    /// Unknown error
    #[error(transparent)]
    UnknownError(anyhow::Error),
}

impl From<anyhow::Error> for MailerError {
    fn from(err: anyhow::Error) -> Self {
        MailerError::UnknownError(err)
    }
}
