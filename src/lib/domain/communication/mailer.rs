//! Mail transport seam.

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

mod errors;
mod message;

pub use errors::MailerError;
pub use message::OutgoingEmail;

/// Mail transport service
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Hand a fully assembled [`OutgoingEmail`] to the transport.
    ///
    /// # Returns
    /// A [`Result`] indicating whether the transport accepted the message.
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailerError>;
}

#[cfg(test)]
mock! {
    pub Mailer {}

    #[async_trait]
    impl Mailer for Mailer {
        async fn send(&self, email: &OutgoingEmail) -> Result<(), MailerError>;
    }
}

#[cfg(test)]
pub mod tests {
    pub use super::MockMailer;
}
