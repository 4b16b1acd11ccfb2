//! Postgres implementation of the RuleActionStore trait

use std::collections::HashMap;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use sqlx::{query, query_scalar};

use crate::{
    domain::rules::{errors::RuleStoreError, RuleActionId, RuleActionStore},
    infrastructure::db::postgres::PostgresDatabase,
};

#[async_trait]
impl RuleActionStore for PostgresDatabase {
    #[mutants::skip]
    async fn load(
        &self,
        rule_action_id: RuleActionId,
    ) -> Result<HashMap<String, String>, RuleStoreError> {
        let params: Option<String> =
            query_scalar("SELECT params FROM rule_action_params WHERE rule_action_id = $1")
                .bind(rule_action_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|err| anyhow!("Unknown database error: {:?}", err))?;

        let params = params.ok_or(RuleStoreError::RuleActionNotFound(rule_action_id))?;

        Ok(serde_json::from_str(&params)
            .with_context(|| format!("invalid stored params for rule action {rule_action_id}"))?)
    }

    #[mutants::skip]
    async fn save(
        &self,
        rule_action_id: RuleActionId,
        params: &HashMap<String, String>,
    ) -> Result<(), RuleStoreError> {
        let params = serde_json::to_string(params).context("failed to serialise params")?;

        query(
            r#"
            INSERT INTO rule_action_params (rule_action_id, params)
            VALUES ($1, $2)
            ON CONFLICT (rule_action_id) DO UPDATE SET params = EXCLUDED.params
            "#,
        )
        .bind(rule_action_id)
        .bind(params)
        .execute(&self.pool)
        .await
        .map_err(|err| anyhow!("Unknown database error: {:?}", err))?;

        Ok(())
    }
}
