//! The "send to related contact" rule action.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

#[cfg(test)]
use mockall::mock;

use crate::domain::{
    batch::{errors::SendBatchError, EmailBatchService, SendEmailRequest, SendReport},
    contacts::{CaseId, ContactDirectory, ContactId},
    rules::{errors::ExecuteRuleError, RuleActionConfig, RuleActionId, RuleActionStore},
};

/// The event that fired a rule action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleTrigger {
    /// The contact whose related contacts receive the message
    pub contact_id: ContactId,

    /// The case the trigger happened on, if any
    pub case_id: Option<CaseId>,
}

/// Rule action service
#[async_trait]
pub trait RuleActionService: Clone + Send + Sync + 'static {
    /// Fire the configured action for a trigger.
    async fn execute(
        &self,
        rule_action_id: RuleActionId,
        trigger: &RuleTrigger,
    ) -> Result<SendReport, ExecuteRuleError>;

    /// Persist a configuration for a rule action id.
    async fn save_configuration(
        &self,
        rule_action_id: RuleActionId,
        config: &RuleActionConfig,
    ) -> Result<(), ExecuteRuleError>;

    /// Load and validate the stored configuration.
    async fn load_configuration(
        &self,
        rule_action_id: RuleActionId,
    ) -> Result<RuleActionConfig, ExecuteRuleError>;
}

#[cfg(test)]
mock! {
    pub RuleActionService {}

    impl Clone for RuleActionService {
        fn clone(&self) -> Self;
    }

    #[async_trait]
    impl RuleActionService for RuleActionService {
        async fn execute(
            &self,
            rule_action_id: RuleActionId,
            trigger: &RuleTrigger,
        ) -> Result<SendReport, ExecuteRuleError>;

        async fn save_configuration(
            &self,
            rule_action_id: RuleActionId,
            config: &RuleActionConfig,
        ) -> Result<(), ExecuteRuleError>;

        async fn load_configuration(
            &self,
            rule_action_id: RuleActionId,
        ) -> Result<RuleActionConfig, ExecuteRuleError>;
    }
}

/// Sends a configured template to the contacts related to the trigger contact.
pub struct SendToRelatedContactAction<D, B, S>
where
    D: ContactDirectory,
    B: EmailBatchService,
    S: RuleActionStore,
{
    directory: Arc<D>,
    batch: B,
    store: Arc<S>,
}

impl<D, B, S> Clone for SendToRelatedContactAction<D, B, S>
where
    D: ContactDirectory,
    B: EmailBatchService,
    S: RuleActionStore,
{
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
            batch: self.batch.clone(),
            store: Arc::clone(&self.store),
        }
    }
}

impl<D, B, S> fmt::Debug for SendToRelatedContactAction<D, B, S>
where
    D: ContactDirectory,
    B: EmailBatchService,
    S: RuleActionStore,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendToRelatedContactAction").finish()
    }
}

impl<D, B, S> SendToRelatedContactAction<D, B, S>
where
    D: ContactDirectory,
    B: EmailBatchService,
    S: RuleActionStore,
{
    /// Create a new rule action service.
    pub fn new(directory: Arc<D>, batch: B, store: Arc<S>) -> Self {
        Self {
            directory,
            batch,
            store,
        }
    }
}

#[async_trait]
impl<D, B, S> RuleActionService for SendToRelatedContactAction<D, B, S>
where
    D: ContactDirectory,
    B: EmailBatchService,
    S: RuleActionStore,
{
    async fn execute(
        &self,
        rule_action_id: RuleActionId,
        trigger: &RuleTrigger,
    ) -> Result<SendReport, ExecuteRuleError> {
        let config = self.load_configuration(rule_action_id).await?;

        let recipients = self
            .directory
            .related_contacts(
                trigger.contact_id,
                config.relationship_type_id,
                config.direction,
            )
            .await?;

        if recipients.is_empty() {
            warn!(
                rule_action_id,
                contact_id = trigger.contact_id,
                relationship_type_id = config.relationship_type_id,
                "no related contacts, nothing to send"
            );

            return Ok(SendReport::new());
        }

        debug!(
            rule_action_id,
            contact_id = trigger.contact_id,
            recipients = recipients.len(),
            "executing rule action"
        );

        let mut request = SendEmailRequest::new(recipients, config.template_id)
            .map_err(SendBatchError::from)?;

        request.from = Some(config.from);
        request.cc = config.cc;
        request.bcc = config.bcc;
        request.location_type_id = config.location_type_id;

        if config.file_on_case {
            request.case_id = trigger.case_id;
        }

        Ok(self.batch.send_batch(&request).await?)
    }

    async fn save_configuration(
        &self,
        rule_action_id: RuleActionId,
        config: &RuleActionConfig,
    ) -> Result<(), ExecuteRuleError> {
        self.store.save(rule_action_id, &config.to_map()).await?;

        Ok(())
    }

    async fn load_configuration(
        &self,
        rule_action_id: RuleActionId,
    ) -> Result<RuleActionConfig, ExecuteRuleError> {
        let params = self.store.load(rule_action_id).await?;

        Ok(RuleActionConfig::from_map(&params)?)
    }
}
