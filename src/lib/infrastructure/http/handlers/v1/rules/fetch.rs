//! Fetch rule action configuration handler

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::{
        batch::EmailBatchService,
        rules::{RuleActionConfig, RuleActionService},
    },
    infrastructure::http::{errors::ApiError, state::AppState},
};

/// Rule action configuration response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RuleConfigurationResponse {
    /// The sender display name
    #[schema(example = "Support Desk")]
    pub from_name: String,

    /// The sender address
    #[schema(example = "support@example.org")]
    pub from_email: String,

    /// The relationship type linking trigger contact and recipients
    #[schema(example = 8)]
    pub relationship_type_id: i64,

    /// Which side of the relationship to deliver to (`a_b` or `b_a`)
    #[schema(example = "a_b")]
    pub relationship_option: String,

    /// The message template to send
    #[schema(example = 42)]
    pub template_id: i64,

    /// Use this location type's email instead of the primary one
    pub location_type_id: Option<i64>,

    /// Carbon-copy addresses
    pub cc: Vec<String>,

    /// Blind carbon-copy addresses
    pub bcc: Vec<String>,

    /// File the audit activity on the triggering case
    pub file_on_case: bool,
}

impl From<RuleActionConfig> for RuleConfigurationResponse {
    fn from(config: RuleActionConfig) -> Self {
        Self {
            from_name: config.from.name,
            from_email: config.from.email.to_string(),
            relationship_type_id: config.relationship_type_id,
            relationship_option: config.direction.as_option().to_string(),
            template_id: config.template_id,
            location_type_id: config.location_type_id,
            cc: config.cc.into_iter().map(String::from).collect(),
            bcc: config.bcc.into_iter().map(String::from).collect(),
            file_on_case: config.file_on_case,
        }
    }
}

/// Fetch the stored configuration for a rule action
#[utoipa::path(
    get,
    operation_id = "get_rule_configuration",
    tag = "Rules",
    path = "/api/v1/rules/{id}",
    params(
        ("id" = i64, Path, description = "The rule action id", example = 3),
    ),
    responses(
        (status = StatusCode::OK, description = "Stored configuration", body = RuleConfigurationResponse),
        (status = StatusCode::NOT_FOUND, description = "Rule action not found", body = ErrorResponse),
        (status = StatusCode::TOO_MANY_REQUESTS, description = "Too many requests"),
    )
)]
pub async fn handler<B: EmailBatchService, R: RuleActionService>(
    State(state): State<AppState<B, R>>,
    Path(id): Path<i64>,
) -> Result<Json<RuleConfigurationResponse>, ApiError> {
    let config = state.rules.load_configuration(id).await?;

    Ok(Json(config.into()))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use testresult::TestResult;

    use crate::{
        domain::{
            batch::SenderIdentity,
            communication::email_addresses::EmailAddress,
            contacts::RelationshipDirection,
            rules::{
                errors::{ExecuteRuleError, RuleStoreError},
                tests::MockRuleActionService,
            },
        },
        infrastructure::http::{
            errors::ErrorResponse, servers::https::router, state::tests::test_state,
        },
    };

    use super::*;

    #[tokio::test]
    async fn test_get_rule_configuration_success() -> TestResult {
        let mut rules = MockRuleActionService::new();

        rules.expect_load_configuration().returning(|_| {
            Ok(RuleActionConfig {
                from: SenderIdentity {
                    name: "Support Desk".to_string(),
                    email: EmailAddress::new_unchecked("support@example.org"),
                },
                relationship_type_id: 8,
                direction: RelationshipDirection::BToA,
                template_id: 42,
                location_type_id: Some(3),
                cc: vec![EmailAddress::new_unchecked("archive@example.org")],
                bcc: Vec::new(),
                file_on_case: false,
            })
        });

        let state = test_state(None, Some(rules));

        let response = TestServer::new(router(state))?.get("/api/v1/rules/3").await;

        let json = response.json::<RuleConfigurationResponse>();

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(json.from_email, "support@example.org");
        assert_eq!(json.relationship_option, "b_a");
        assert_eq!(json.cc, vec!["archive@example.org".to_string()]);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_rule_configuration_not_found() -> TestResult {
        let mut rules = MockRuleActionService::new();

        rules.expect_load_configuration().returning(|id| {
            Err(ExecuteRuleError::Store(RuleStoreError::RuleActionNotFound(
                id,
            )))
        });

        let state = test_state(None, Some(rules));

        let response = TestServer::new(router(state))?
            .get("/api/v1/rules/99")
            .await;

        let json = response.json::<ErrorResponse>();

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(json.error, "Could not find rule action with ID: 99");

        Ok(())
    }
}
