//! Configure rule action handler

use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
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

/// Rule action configuration request body
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RuleConfigurationBody {
    /// The sender display name
    #[schema(example = "Support Desk")]
    from_name: String,

    /// The sender address
    #[schema(example = "support@example.org")]
    from_email: String,

    /// The relationship type linking trigger contact and recipients
    #[schema(example = 8)]
    relationship_type_id: i64,

    /// Which side of the relationship to deliver to (`a_b` or `b_a`)
    #[schema(example = "a_b")]
    relationship_option: String,

    /// The message template to send
    #[schema(example = 42)]
    template_id: i64,

    /// Use this location type's email instead of the primary one
    location_type_id: Option<i64>,

    /// Comma or semicolon separated carbon-copy addresses
    cc: Option<String>,

    /// Comma or semicolon separated blind carbon-copy addresses
    bcc: Option<String>,

    /// File the audit activity on the triggering case
    file_on_case: Option<bool>,
}

impl TryFrom<RuleConfigurationBody> for RuleActionConfig {
    type Error = ApiError;

    fn try_from(body: RuleConfigurationBody) -> Result<Self, Self::Error> {
        let mut map = HashMap::from([
            ("version".to_string(), "1".to_string()),
            ("from_name".to_string(), body.from_name),
            ("from_email".to_string(), body.from_email),
            (
                "relationship_type_id".to_string(),
                body.relationship_type_id.to_string(),
            ),
            ("relationship_option".to_string(), body.relationship_option),
            ("template_id".to_string(), body.template_id.to_string()),
            (
                "file_on_case".to_string(),
                if body.file_on_case.unwrap_or(false) {
                    "1"
                } else {
                    "0"
                }
                .to_string(),
            ),
        ]);

        if let Some(location_type_id) = body.location_type_id {
            map.insert("location_type_id".to_string(), location_type_id.to_string());
        }

        if let Some(cc) = body.cc {
            map.insert("cc".to_string(), cc);
        }

        if let Some(bcc) = body.bcc {
            map.insert("bcc".to_string(), bcc);
        }

        Ok(RuleActionConfig::from_map(&map)?)
    }
}

/// Store the configuration for a rule action
#[utoipa::path(
    put,
    operation_id = "configure_rule",
    tag = "Rules",
    path = "/api/v1/rules/{id}",
    params(
        ("id" = i64, Path, description = "The rule action id", example = 3),
    ),
    request_body = RuleConfigurationBody,
    responses(
        (status = StatusCode::NO_CONTENT, description = "Configuration stored"),
        (status = StatusCode::UNPROCESSABLE_ENTITY, description = "Invalid configuration", body = ErrorResponse),
        (status = StatusCode::TOO_MANY_REQUESTS, description = "Too many requests"),
    )
)]
pub async fn handler<B: EmailBatchService, R: RuleActionService>(
    State(state): State<AppState<B, R>>,
    Path(id): Path<i64>,
    request: Result<Json<RuleConfigurationBody>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(body) = request?;

    let config: RuleActionConfig = body.try_into()?;

    state.rules.save_configuration(id, &config).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use testresult::TestResult;

    use crate::{
        domain::rules::tests::MockRuleActionService,
        infrastructure::http::{
            errors::ErrorResponse, servers::https::router, state::tests::test_state,
        },
    };

    use super::*;

    fn body() -> RuleConfigurationBody {
        RuleConfigurationBody {
            from_name: "Support Desk".to_string(),
            from_email: "support@example.org".to_string(),
            relationship_type_id: 8,
            relationship_option: "a_b".to_string(),
            template_id: 42,
            location_type_id: None,
            cc: None,
            bcc: None,
            file_on_case: Some(true),
        }
    }

    #[tokio::test]
    async fn test_configure_rule_success() -> TestResult {
        let mut rules = MockRuleActionService::new();

        rules
            .expect_save_configuration()
            .withf(|id, config: &RuleActionConfig| {
                *id == 3
                    && config.template_id == 42
                    && config.relationship_type_id == 8
                    && config.file_on_case
            })
            .returning(|_, _| Ok(()));

        let state = test_state(None, Some(rules));

        let response = TestServer::new(router(state))?
            .put("/api/v1/rules/3")
            .json(&body())
            .await;

        assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

        Ok(())
    }

    #[tokio::test]
    async fn test_configure_rule_malformed_direction() -> TestResult {
        let state = test_state(None, None);

        let mut request_body = body();
        request_body.relationship_option = "sideways".to_string();

        let response = TestServer::new(router(state))?
            .put("/api/v1/rules/3")
            .json(&request_body)
            .await;

        let json = response.json::<ErrorResponse>();

        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            json.error,
            "Malformed rule action configuration field relationship_option: sideways"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_configure_rule_invalid_from_email() -> TestResult {
        let state = test_state(None, None);

        let mut request_body = body();
        request_body.from_email = "not-an-address".to_string();

        let response = TestServer::new(router(state))?
            .put("/api/v1/rules/3")
            .json(&request_body)
            .await;

        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        Ok(())
    }
}
