//! Rule actions: configurable "send a template to a related contact" steps
//! fired by an external rule engine.

mod action;
mod config;
mod store;

pub mod errors;

pub use action::{RuleActionService, RuleTrigger, SendToRelatedContactAction};
pub use config::RuleActionConfig;
pub use store::RuleActionStore;

/// Identifier of a configured rule action instance
pub type RuleActionId = i64;
