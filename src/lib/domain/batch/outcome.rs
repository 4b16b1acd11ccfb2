//! Per-recipient send outcomes.

use std::collections::BTreeMap;

use crate::domain::{activities::ActivityId, contacts::ContactId};

/// What happened for one dispatched recipient.
///
/// Suppressed recipients never get an outcome; their absence from the report
/// is the record of the suppression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendOutcome {
    /// Whether the transport accepted the message
    pub delivered: bool,

    /// Human-readable status message
    pub status: String,

    /// The audit activity created for a delivered message
    pub activity_id: Option<ActivityId>,
}

/// Aggregated outcomes for a request, keyed by recipient.
pub type SendReport = BTreeMap<ContactId, SendOutcome>;
