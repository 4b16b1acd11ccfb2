//! The batch orchestrator.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{debug, warn};

#[cfg(test)]
use mockall::mock;

use crate::domain::{
    activities::{combine_details, ActivityStore, NewActivity},
    batch::{errors::SendBatchError, SendEmailRequest, SendOutcome, SendReport, SenderIdentity},
    communication::mailer::{Mailer, OutgoingEmail},
    contacts::{Contact, ContactDirectory, MailFormat},
    templates::TemplateStore,
    tokens::{RecipientContext, RenderedMessage, TokenRenderer},
};

/// Request-level processing options.
#[derive(Clone, Debug)]
pub struct BatchOptions {
    /// Collect per-recipient delivery failures instead of aborting the batch
    /// on the first one. Off by default for compatibility with the original
    /// first-failure-aborts contract.
    pub continue_on_error: bool,

    /// Upper bound for processing one whole request
    pub deadline: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            continue_on_error: false,
            deadline: Duration::from_secs(60),
        }
    }
}

/// Batch email service
#[async_trait]
pub trait EmailBatchService: Clone + Send + Sync + 'static {
    /// Send one template to every recipient in the request.
    ///
    /// # Returns
    /// A [`SendReport`] with one entry per recipient that was actually
    /// dispatched; suppressed recipients produce no entry.
    async fn send_batch(&self, request: &SendEmailRequest) -> Result<SendReport, SendBatchError>;
}

#[cfg(test)]
mock! {
    pub EmailBatchService {}

    impl Clone for EmailBatchService {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl EmailBatchService for EmailBatchService {
        async fn send_batch(&self, request: &SendEmailRequest) -> Result<SendReport, SendBatchError>;
    }
}

/// Batch email service implementation
pub struct EmailBatchServiceImpl<D, T, M, A>
where
    D: ContactDirectory,
    T: TemplateStore,
    M: Mailer,
    A: ActivityStore,
{
    directory: Arc<D>,
    templates: Arc<T>,
    mailer: Arc<M>,
    activities: Arc<A>,
    renderer: Arc<TokenRenderer>,
    identity: SenderIdentity,
    options: BatchOptions,
}

impl<D, T, M, A> Clone for EmailBatchServiceImpl<D, T, M, A>
where
    D: ContactDirectory,
    T: TemplateStore,
    M: Mailer,
    A: ActivityStore,
{
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
            templates: Arc::clone(&self.templates),
            mailer: Arc::clone(&self.mailer),
            activities: Arc::clone(&self.activities),
            renderer: Arc::clone(&self.renderer),
            identity: self.identity.clone(),
            options: self.options.clone(),
        }
    }
}

impl<D, T, M, A> fmt::Debug for EmailBatchServiceImpl<D, T, M, A>
where
    D: ContactDirectory,
    T: TemplateStore,
    M: Mailer,
    A: ActivityStore,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailBatchServiceImpl")
            .field("identity", &self.identity)
            .field("options", &self.options)
            .finish()
    }
}

impl<D, T, M, A> EmailBatchServiceImpl<D, T, M, A>
where
    D: ContactDirectory,
    T: TemplateStore,
    M: Mailer,
    A: ActivityStore,
{
    /// Create a new batch email service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        directory: Arc<D>,
        templates: Arc<T>,
        mailer: Arc<M>,
        activities: Arc<A>,
        renderer: Arc<TokenRenderer>,
        identity: SenderIdentity,
        options: BatchOptions,
    ) -> Self {
        Self {
            directory,
            templates,
            mailer,
            activities,
            renderer,
            identity,
            options,
        }
    }

    async fn process(&self, request: &SendEmailRequest) -> Result<SendReport, SendBatchError> {
        request.validate()?;

        let template = self
            .templates
            .active_template_by_id(request.template_id)
            .await?
            .resolve()?;

        let mut report = SendReport::new();

        for &contact_id in &request.recipients {
            let contact = self
                .directory
                .contact_by_id(contact_id, request.location_type_id)
                .await?;

            let target = match contact.delivery_target(request.override_address.as_ref()) {
                Ok(target) => target,
                Err(reason) => {
                    debug!(contact_id, %reason, "recipient suppressed");
                    continue;
                }
            };

            let context = self.recipient_context(contact, request).await;
            let rendered = self.renderer.render(&template, &context);
            let (html, text) = select_parts(&rendered, context.contact.preferred_mail_format);

            let from = request.from.as_ref().unwrap_or(&self.identity);

            let email = OutgoingEmail {
                to_name: target.name.clone(),
                to_email: target.email.clone(),
                from_name: from.name.clone(),
                from_email: from.email.clone(),
                cc: request.cc.clone(),
                bcc: request.bcc.clone(),
                subject: rendered.subject.clone(),
                html,
                text,
            };

            if let Err(err) = self.mailer.send(&email).await {
                if self.options.continue_on_error {
                    warn!(contact_id, error = %err, "delivery failed, continuing batch");
                    report.insert(
                        contact_id,
                        SendOutcome {
                            delivered: false,
                            status: format!("Error sending e-mail to {}", target.email),
                            activity_id: None,
                        },
                    );
                    continue;
                }

                return Err(SendBatchError::Delivery {
                    contact_id,
                    to: target.email.to_string(),
                    source: err,
                });
            }

            // The audit record keeps both rendered representations, not just
            // the parts the recipient's preference selected.
            let details = combine_details(rendered.html.as_deref(), Some(&rendered.text));
            let activity = NewActivity::email_sent(contact_id, &rendered.subject, details);

            let activity_id = self
                .activities
                .create_activity(&activity)
                .await
                .map_err(|source| SendBatchError::AuditWrite { contact_id, source })?;

            if let Some(case_id) = request.case_id {
                self.activities
                    .file_on_case(activity_id, case_id)
                    .await
                    .map_err(|source| SendBatchError::AuditWrite { contact_id, source })?;
            }

            report.insert(
                contact_id,
                SendOutcome {
                    delivered: true,
                    status: format!("Successfully sent e-mail to {}", target.email),
                    activity_id: Some(activity_id),
                },
            );
        }

        Ok(report)
    }

    /// Build the token context for one recipient. A failed linked-entity
    /// lookup skips that token class rather than aborting the send.
    async fn recipient_context(
        &self,
        contact: Contact,
        request: &SendEmailRequest,
    ) -> RecipientContext {
        let mut context = RecipientContext::for_contact(contact);

        if let Some(case_id) = request.case_id {
            match self.directory.case_attributes(case_id).await {
                Ok(attributes) => context.case = Some(attributes),
                Err(err) => warn!(case_id, error = %err, "case lookup failed, skipping case tokens"),
            }
        }

        if let Some(contribution_id) = request.contribution_id {
            match self.directory.contribution_attributes(contribution_id).await {
                Ok(attributes) => context.contribution = Some(attributes),
                Err(err) => {
                    warn!(contribution_id, error = %err, "contribution lookup failed, skipping contribution tokens");
                }
            }
        }

        if let Some(activity_id) = request.activity_id {
            match self.directory.activity_attributes(activity_id).await {
                Ok(attributes) => context.activity = Some(attributes),
                Err(err) => {
                    warn!(activity_id, error = %err, "activity lookup failed, skipping activity tokens");
                }
            }
        }

        context
    }
}

#[async_trait]
impl<D, T, M, A> EmailBatchService for EmailBatchServiceImpl<D, T, M, A>
where
    D: ContactDirectory,
    T: TemplateStore,
    M: Mailer,
    A: ActivityStore,
{
    async fn send_batch(&self, request: &SendEmailRequest) -> Result<SendReport, SendBatchError> {
        match timeout(self.options.deadline, self.process(request)).await {
            Ok(result) => result,
            Err(_) => Err(SendBatchError::DeadlineExceeded),
        }
    }
}

/// Choose which body parts to send for one recipient.
///
/// Text goes out when there is no HTML body or the preference asks for it;
/// HTML goes out only when one exists and the preference asks for it. Encoded
/// ampersands are decoded in the text part so links stay clickable in
/// plain-text clients.
fn select_parts(rendered: &RenderedMessage, format: MailFormat) -> (Option<String>, Option<String>) {
    let include_text =
        rendered.html.is_none() || matches!(format, MailFormat::Text | MailFormat::Both);

    let text = include_text.then(|| rendered.text.replace("&amp;", "&"));

    let html = match (&rendered.html, format) {
        (Some(html), MailFormat::Html | MailFormat::Both) => Some(html.clone()),
        _ => None,
    };

    (html, text)
}
