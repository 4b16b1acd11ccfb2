//! Activities: audit records for sent email.

mod activity;
mod store;

pub mod errors;

pub use activity::{
    combine_details, NewActivity, ACTIVITY_STATUS_COMPLETED, ACTIVITY_TYPE_EMAIL,
};
pub use store::ActivityStore;

/// Identifier of an activity record
pub type ActivityId = i64;
