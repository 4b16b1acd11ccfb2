//! SMTP mailer implementation

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use lettre::{
    address::Address,
    message::{header::ContentType, Mailbox, MessageBuilder, MultiPart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    Message, SmtpTransport, Transport,
};
use tracing::error;

use crate::domain::communication::{
    email_addresses::EmailAddress,
    mailer::{Mailer, MailerError, OutgoingEmail},
};

/// SMTP configuration
#[derive(Clone, Default, Debug, Parser)]
pub struct SMTPConfig {
    /// The SMTP host
    #[clap(long, env = "SMTP_HOST")]
    pub host: String,

    /// The SMTP port
    #[clap(long, env = "SMTP_PORT")]
    pub port: u16,

    /// The SMTP username
    #[clap(long, env = "SMTP_USER")]
    pub username: String,

    /// The SMTP password
    #[clap(long, env = "SMTP_PASSWORD")]
    pub password: String,

    /// Verify the TLS certificate
    #[clap(long, env = "SMTP_VERIFY_TLS", default_value = "true")]
    pub verify_tls: bool,

    /// Enable STARTTLS (TLS upgrade on connection)
    #[clap(long, env = "SMTP_STARTTLS", default_value = "true")]
    pub starttls: bool,
}

/// SMTP mailer
#[derive(Debug, Default, Clone)]
pub struct SMTPMailer {
    config: SMTPConfig,
}

impl SMTPMailer {
    /// Create a new SMTP mailer
    pub fn new(config: SMTPConfig) -> Self {
        Self { config }
    }

    /// Build the SMTP transport from the configuration
    pub fn mailer(&self) -> Result<SmtpTransport> {
        let creds = Credentials::new(self.config.username.clone(), self.config.password.clone());

        let relay = if self.config.starttls {
            SmtpTransport::starttls_relay(&self.config.host)?
        } else {
            SmtpTransport::relay(&self.config.host)?
        };

        Ok(relay
            .credentials(creds)
            .port(self.config.port)
            .tls(Tls::Opportunistic(
                TlsParameters::builder(self.config.host.to_string())
                    .dangerous_accept_invalid_certs(!self.config.verify_tls)
                    .build()?,
            ))
            .build())
    }
}

fn mailbox(name: &str, email: &EmailAddress) -> Result<Mailbox, MailerError> {
    let address: Address = email
        .as_str()
        .parse()
        .map_err(|_| MailerError::InvalidEmail)?;

    let name = (!name.is_empty()).then(|| name.to_string());

    Ok(Mailbox::new(name, address))
}

fn build_message(builder: MessageBuilder, email: &OutgoingEmail) -> Result<Message, MailerError> {
    let result = match (&email.html, &email.text) {
        (Some(html), Some(text)) => builder.multipart(MultiPart::alternative_plain_html(
            text.clone(),
            html.clone(),
        )),
        (Some(html), None) => builder
            .header(ContentType::TEXT_HTML)
            .body(html.clone()),
        (None, Some(text)) => builder
            .header(ContentType::TEXT_PLAIN)
            .body(text.clone()),
        (None, None) => return Err(MailerError::EmptyBody),
    };

    result.map_err(|err| MailerError::UnknownError(err.into()))
}

#[async_trait]
impl Mailer for SMTPMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailerError> {
        let mut builder = Message::builder()
            .from(mailbox(&email.from_name, &email.from_email)?)
            .to(mailbox(&email.to_name, &email.to_email)?)
            .subject(email.subject.clone());

        for cc in &email.cc {
            builder = builder.cc(mailbox("", cc)?);
        }

        for bcc in &email.bcc {
            builder = builder.bcc(mailbox("", bcc)?);
        }

        let message = build_message(builder, email)?;

        match self.mailer()?.send(&message) {
            Ok(_) => Ok(()),
            Err(err) => {
                error!(to = %email.to_email, error = %err, "SMTP transport rejected the message");
                Err(MailerError::SendError)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outgoing() -> OutgoingEmail {
        OutgoingEmail {
            to_name: "Ana Pereira".to_string(),
            to_email: EmailAddress::new_unchecked("ana@example.com"),
            from_name: "Example Org".to_string(),
            from_email: EmailAddress::new_unchecked("noreply@example.org"),
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: "Hello".to_string(),
            html: Some("<p>Hello</p>".to_string()),
            text: Some("Hello".to_string()),
        }
    }

    #[test]
    fn test_build_message_multipart_when_both_parts_exist() {
        let email = outgoing();

        let builder = Message::builder()
            .from(mailbox(&email.from_name, &email.from_email).unwrap())
            .to(mailbox(&email.to_name, &email.to_email).unwrap())
            .subject(email.subject.clone());

        let message = build_message(builder, &email).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("Hello"));
    }

    #[test]
    fn test_build_message_without_body_is_rejected() {
        let mut email = outgoing();
        email.html = None;
        email.text = None;

        let builder = Message::builder()
            .from(mailbox(&email.from_name, &email.from_email).unwrap())
            .to(mailbox(&email.to_name, &email.to_email).unwrap())
            .subject(email.subject.clone());

        assert!(matches!(
            build_message(builder, &email),
            Err(MailerError::EmptyBody)
        ));
    }

    #[test]
    fn test_mailbox_with_empty_name_has_no_display_name() {
        let mailbox = mailbox("", &EmailAddress::new_unchecked("ana@example.com")).unwrap();

        assert!(mailbox.name.is_none());
    }
}
