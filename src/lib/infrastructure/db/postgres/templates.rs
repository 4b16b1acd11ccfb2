//! Postgres implementation of the TemplateStore trait

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::{query_as, FromRow};

use crate::{
    domain::templates::{errors::GetTemplateError, MessageTemplate, TemplateId, TemplateStore},
    infrastructure::db::postgres::PostgresDatabase,
};

#[derive(FromRow)]
struct TemplateRecord {
    id: i64,
    title: String,
    subject: String,
    html: Option<String>,
    text: Option<String>,
}

impl From<TemplateRecord> for MessageTemplate {
    fn from(record: TemplateRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            subject: record.subject,
            html: record.html,
            text: record.text,
        }
    }
}

#[async_trait]
impl TemplateStore for PostgresDatabase {
    #[mutants::skip]
    async fn active_template_by_id(
        &self,
        id: TemplateId,
    ) -> Result<MessageTemplate, GetTemplateError> {
        // Workflow templates are system messages, never offered for sending.
        let record: Option<TemplateRecord> = query_as(
            r#"
            SELECT id, title, subject, html, text
            FROM message_templates
            WHERE id = $1 AND is_active AND workflow_name IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| anyhow!("Unknown database error: {:?}", err))?;

        record
            .map(Into::into)
            .ok_or(GetTemplateError::TemplateNotFound(id))
    }
}
