//! Activity store seam.

use async_trait::async_trait;

#[cfg(test)]
use mockall::mock;

use crate::domain::{
    activities::{errors::RecordActivityError, ActivityId, NewActivity},
    contacts::CaseId,
};

/// Writes audit activities and their case links.
#[async_trait]
pub trait ActivityStore: Send + Sync + 'static {
    /// Persist an email activity, marking the recipient as its target.
    ///
    /// # Returns
    /// The created [`ActivityId`].
    async fn create_activity(
        &self,
        activity: &NewActivity,
    ) -> Result<ActivityId, RecordActivityError>;

    /// Associate an existing activity with a case.
    async fn file_on_case(
        &self,
        activity_id: ActivityId,
        case_id: CaseId,
    ) -> Result<(), RecordActivityError>;
}

#[cfg(test)]
mock! {
    pub ActivityStore {}

    #[async_trait]
    impl ActivityStore for ActivityStore {
        async fn create_activity(
            &self,
            activity: &NewActivity,
        ) -> Result<ActivityId, RecordActivityError>;

        async fn file_on_case(
            &self,
            activity_id: ActivityId,
            case_id: CaseId,
        ) -> Result<(), RecordActivityError>;
    }
}
