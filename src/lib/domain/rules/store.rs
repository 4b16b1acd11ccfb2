//! Persistence seam for rule action configurations.

use std::collections::HashMap;

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

use crate::domain::rules::{errors::RuleStoreError, RuleActionId};

/// Stores the raw configuration map per rule action id. Validation happens in
/// [`RuleActionConfig`](crate::domain::rules::RuleActionConfig), not here.
#[async_trait]
pub trait RuleActionStore: Send + Sync + 'static {
    /// Load the stored configuration map.
    async fn load(
        &self,
        rule_action_id: RuleActionId,
    ) -> Result<HashMap<String, String>, RuleStoreError>;

    /// Save the configuration map, replacing any previous one.
    async fn save(
        &self,
        rule_action_id: RuleActionId,
        params: &HashMap<String, String>,
    ) -> Result<(), RuleStoreError>;
}

#[cfg(test)]
mock! {
    pub RuleActionStore {}

    #[async_trait]
    impl RuleActionStore for RuleActionStore {
        async fn load(
            &self,
            rule_action_id: RuleActionId,
        ) -> Result<HashMap<String, String>, RuleStoreError>;

        async fn save(
            &self,
            rule_action_id: RuleActionId,
            params: &HashMap<String, String>,
        ) -> Result<(), RuleStoreError>;
    }
}
