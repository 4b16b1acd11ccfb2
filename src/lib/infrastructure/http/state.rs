//! Application state module

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::{batch::EmailBatchService, rules::RuleActionService};

/// Global application state
pub struct AppState<B: EmailBatchService, R: RuleActionService> {
    /// The time the server started
    pub start_time: DateTime<Utc>,

    /// Batch email service
    pub batch: Arc<B>,

    /// Rule action service
    pub rules: Arc<R>,
}

impl<B, R> AppState<B, R>
where
    B: EmailBatchService,
    R: RuleActionService,
{
    /// Create a new application state
    pub fn new(batch: B, rules: R) -> Self {
        Self {
            start_time: Utc::now(),
            batch: Arc::new(batch),
            rules: Arc::new(rules),
        }
    }
}

impl<B, R> Clone for AppState<B, R>
where
    B: EmailBatchService,
    R: RuleActionService,
{
    fn clone(&self) -> Self {
        Self {
            start_time: self.start_time,
            batch: Arc::clone(&self.batch),
            rules: Arc::clone(&self.rules),
        }
    }
}

impl<B, R> fmt::Debug for AppState<B, R>
where
    B: EmailBatchService,
    R: RuleActionService,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("start_time", &self.start_time)
            .field("batch", &"EmailBatchService")
            .field("rules", &"RuleActionService")
            .finish()
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    use crate::domain::{
        batch::tests::MockEmailBatchService, rules::tests::MockRuleActionService,
    };

    pub fn test_state(
        batch: Option<MockEmailBatchService>,
        rules: Option<MockRuleActionService>,
    ) -> AppState<MockEmailBatchService, MockRuleActionService> {
        let batch = batch
            .map(Arc::new)
            .unwrap_or_else(|| Arc::new(MockEmailBatchService::new()));

        let rules = rules
            .map(Arc::new)
            .unwrap_or_else(|| Arc::new(MockRuleActionService::new()));

        AppState {
            start_time: Utc::now(),
            batch,
            rules,
        }
    }
}
