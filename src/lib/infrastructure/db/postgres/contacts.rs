//! Postgres implementation of the ContactDirectory trait

use std::collections::HashMap;

use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::{query_as, query_scalar, FromRow};

use crate::{
    domain::{
        activities::ActivityId,
        communication::email_addresses::EmailAddress,
        contacts::{
            errors::DirectoryError, CaseId, Contact, ContactDirectory, ContactId, ContributionId,
            LocationTypeId, MailFormat, RelationshipDirection, RelationshipTypeId,
        },
    },
    infrastructure::db::postgres::PostgresDatabase,
};

#[derive(FromRow)]
struct ContactRecord {
    id: i64,
    display_name: String,
    do_not_email: bool,
    is_deceased: bool,
    preferred_mail_format: Option<String>,
    email_greeting: Option<String>,
    postal_greeting: Option<String>,
    addressee: Option<String>,
    email: Option<String>,
    on_hold: Option<bool>,
}

impl ContactRecord {
    fn into_contact(self, attributes: HashMap<String, String>) -> Contact {
        Contact {
            id: self.id,
            display_name: self.display_name,
            email: self
                .email
                .as_deref()
                .filter(|email| !email.is_empty())
                .map(EmailAddress::new_unchecked),
            do_not_email: self.do_not_email,
            is_deceased: self.is_deceased,
            on_hold: self.on_hold.unwrap_or(false),
            preferred_mail_format: self
                .preferred_mail_format
                .as_deref()
                .map_or(MailFormat::Both, MailFormat::from_label),
            email_greeting: self.email_greeting,
            postal_greeting: self.postal_greeting,
            addressee: self.addressee,
            attributes,
        }
    }
}

impl PostgresDatabase {
    async fn attribute_rows(
        &self,
        sql: &str,
        id: i64,
    ) -> Result<HashMap<String, String>, DirectoryError> {
        let rows: Vec<(String, String)> = query_as(sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(|err| anyhow!("Unknown database error: {:?}", err))?;

        Ok(rows.into_iter().collect())
    }

    async fn entity_exists(
        &self,
        sql: &str,
        entity: &'static str,
        id: i64,
    ) -> Result<(), DirectoryError> {
        let found: Option<i64> = query_scalar(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| anyhow!("Unknown database error: {:?}", err))?;

        match found {
            Some(_) => Ok(()),
            None => Err(DirectoryError::EntityNotFound { entity, id }),
        }
    }
}

#[async_trait]
impl ContactDirectory for PostgresDatabase {
    #[mutants::skip]
    async fn contact_by_id(
        &self,
        id: ContactId,
        location_type: Option<LocationTypeId>,
    ) -> Result<Contact, DirectoryError> {
        // One email row is chosen per contact: the requested location type's
        // when given, the primary one otherwise.
        let record: Option<ContactRecord> = query_as(
            r#"
            SELECT c.id, c.display_name, c.do_not_email, c.is_deceased,
                   c.preferred_mail_format, c.email_greeting, c.postal_greeting,
                   c.addressee, e.email, e.on_hold
            FROM contacts c
            LEFT JOIN emails e ON e.contact_id = c.id
                AND ((CAST($2 AS BIGINT) IS NOT NULL AND e.location_type_id = $2)
                  OR (CAST($2 AS BIGINT) IS NULL AND e.is_primary))
            WHERE c.id = $1
            ORDER BY e.is_primary DESC
            LIMIT 1
            "#,
        )
        .bind(id)
        .bind(location_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| anyhow!("Unknown database error: {:?}", err))?;

        let record = record.ok_or(DirectoryError::ContactNotFound(id))?;

        let attributes = self
            .attribute_rows(
                "SELECT name, value FROM contact_attributes WHERE contact_id = $1",
                id,
            )
            .await?;

        Ok(record.into_contact(attributes))
    }

    #[mutants::skip]
    async fn related_contacts(
        &self,
        primary: ContactId,
        relationship_type: RelationshipTypeId,
        direction: RelationshipDirection,
    ) -> Result<Vec<ContactId>, DirectoryError> {
        let a_to_b = direction == RelationshipDirection::AToB;

        let related: Vec<i64> = query_scalar(
            r#"
            SELECT CASE WHEN $3 THEN r.contact_id_b ELSE r.contact_id_a END AS related
            FROM relationships r
            WHERE r.is_active
              AND r.relationship_type_id = $2
              AND (CASE WHEN $3 THEN r.contact_id_a ELSE r.contact_id_b END) = $1
            ORDER BY related
            "#,
        )
        .bind(primary)
        .bind(relationship_type)
        .bind(a_to_b)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| anyhow!("Unknown database error: {:?}", err))?;

        Ok(related)
    }

    #[mutants::skip]
    async fn case_attributes(
        &self,
        id: CaseId,
    ) -> Result<HashMap<String, String>, DirectoryError> {
        self.entity_exists("SELECT id FROM cases WHERE id = $1", "case", id)
            .await?;

        self.attribute_rows(
            "SELECT name, value FROM case_attributes WHERE case_id = $1",
            id,
        )
        .await
    }

    #[mutants::skip]
    async fn contribution_attributes(
        &self,
        id: ContributionId,
    ) -> Result<HashMap<String, String>, DirectoryError> {
        self.entity_exists(
            "SELECT id FROM contributions WHERE id = $1",
            "contribution",
            id,
        )
        .await?;

        self.attribute_rows(
            "SELECT name, value FROM contribution_attributes WHERE contribution_id = $1",
            id,
        )
        .await
    }

    #[mutants::skip]
    async fn activity_attributes(
        &self,
        id: ActivityId,
    ) -> Result<HashMap<String, String>, DirectoryError> {
        self.entity_exists("SELECT id FROM activities WHERE id = $1", "activity", id)
            .await?;

        self.attribute_rows(
            "SELECT name, value FROM activity_attributes WHERE activity_id = $1",
            id,
        )
        .await
    }
}
