//! Postgres implementation of the ActivityStore trait

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::{query, query_scalar};

use crate::{
    domain::{
        activities::{
            errors::RecordActivityError, ActivityId, ActivityStore, NewActivity,
            ACTIVITY_STATUS_COMPLETED, ACTIVITY_TYPE_EMAIL,
        },
        contacts::CaseId,
    },
    infrastructure::db::postgres::PostgresDatabase,
};

#[async_trait]
impl ActivityStore for PostgresDatabase {
    #[mutants::skip]
    async fn create_activity(
        &self,
        activity: &NewActivity,
    ) -> Result<ActivityId, RecordActivityError> {
        // The activity row and its target link land together or not at all.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| RecordActivityError::WriteFailed(anyhow!("{:?}", err)))?;

        let activity_id: i64 = query_scalar(
            r#"
            INSERT INTO activities
                (activity_type, status, subject, details, activity_date_time, source_contact_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(ACTIVITY_TYPE_EMAIL)
        .bind(ACTIVITY_STATUS_COMPLETED)
        .bind(&activity.subject)
        .bind(&activity.details)
        .bind(activity.date_time)
        .bind(activity.source_contact_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| RecordActivityError::WriteFailed(anyhow!("{:?}", err)))?;

        query("INSERT INTO activity_targets (activity_id, contact_id) VALUES ($1, $2)")
            .bind(activity_id)
            .bind(activity.target_contact_id)
            .execute(&mut *tx)
            .await
            .map_err(|err| RecordActivityError::WriteFailed(anyhow!("{:?}", err)))?;

        tx.commit()
            .await
            .map_err(|err| RecordActivityError::WriteFailed(anyhow!("{:?}", err)))?;

        Ok(activity_id)
    }

    #[mutants::skip]
    async fn file_on_case(
        &self,
        activity_id: ActivityId,
        case_id: CaseId,
    ) -> Result<(), RecordActivityError> {
        query("INSERT INTO case_activities (case_id, activity_id) VALUES ($1, $2)")
            .bind(case_id)
            .bind(activity_id)
            .execute(&self.pool)
            .await
            .map_err(|err| RecordActivityError::CaseLinkFailed {
                case_id,
                source: anyhow!("{:?}", err),
            })?;

        Ok(())
    }
}
