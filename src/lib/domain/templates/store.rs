//! Template store seam.

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

use crate::domain::templates::{errors::GetTemplateError, MessageTemplate, TemplateId};

/// Read-only access to stored message templates.
///
/// Only active, non-workflow templates are visible through this seam.
#[async_trait]
pub trait TemplateStore: Send + Sync + 'static {
    /// Look up an active template by id.
    ///
    /// # Returns
    /// The [`MessageTemplate`], or [`GetTemplateError::TemplateNotFound`]
    /// when no active template matches.
    async fn active_template_by_id(
        &self,
        id: TemplateId,
    ) -> Result<MessageTemplate, GetTemplateError>;
}

#[cfg(test)]
mock! {
    pub TemplateStore {}

    #[async_trait]
    impl TemplateStore for TemplateStore {
        async fn active_template_by_id(
            &self,
            id: TemplateId,
        ) -> Result<MessageTemplate, GetTemplateError>;
    }
}
