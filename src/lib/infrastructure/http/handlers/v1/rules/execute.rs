//! Execute rule action handler

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::{
        batch::EmailBatchService,
        rules::{RuleActionService, RuleTrigger},
    },
    infrastructure::http::{
        errors::ApiError, handlers::v1::email::send::SendEmailResponse, state::AppState,
    },
};

/// Execute rule action request body
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ExecuteRuleBody {
    /// The contact whose related contacts receive the message
    #[schema(example = 7)]
    contact_id: i64,

    /// The case the trigger happened on, if any
    case_id: Option<i64>,
}

impl From<ExecuteRuleBody> for RuleTrigger {
    fn from(body: ExecuteRuleBody) -> Self {
        Self {
            contact_id: body.contact_id,
            case_id: body.case_id,
        }
    }
}

/// Fire a configured rule action for a trigger contact
#[utoipa::path(
    post,
    operation_id = "execute_rule",
    tag = "Rules",
    path = "/api/v1/rules/{id}/execute",
    params(
        ("id" = i64, Path, description = "The rule action id", example = 3),
    ),
    request_body = ExecuteRuleBody,
    responses(
        (status = StatusCode::OK, description = "Rule action executed", body = SendEmailResponse),
        (status = StatusCode::NOT_FOUND, description = "Rule action not found", body = ErrorResponse),
        (status = StatusCode::UNPROCESSABLE_ENTITY, description = "Invalid stored configuration", body = ErrorResponse),
        (status = StatusCode::TOO_MANY_REQUESTS, description = "Too many requests"),
    )
)]
pub async fn handler<B: EmailBatchService, R: RuleActionService>(
    State(state): State<AppState<B, R>>,
    Path(id): Path<i64>,
    request: Result<Json<ExecuteRuleBody>, JsonRejection>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    let Json(body) = request?;

    let report = state.rules.execute(id, &body.into()).await?;

    Ok(Json(report.into()))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use testresult::TestResult;

    use crate::{
        domain::{
            batch::{SendOutcome, SendReport},
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
    async fn test_execute_rule_success() -> TestResult {
        let mut rules = MockRuleActionService::new();

        rules
            .expect_execute()
            .withf(|id, trigger: &RuleTrigger| {
                *id == 3 && trigger.contact_id == 7 && trigger.case_id == Some(600)
            })
            .returning(|_, _| {
                let mut report = SendReport::new();
                report.insert(
                    20,
                    SendOutcome {
                        delivered: true,
                        status: "Successfully sent e-mail to carer@example.com".to_string(),
                        activity_id: Some(55),
                    },
                );
                Ok(report)
            });

        let state = test_state(None, Some(rules));

        let response = TestServer::new(router(state))?
            .post("/api/v1/rules/3/execute")
            .json(&ExecuteRuleBody {
                contact_id: 7,
                case_id: Some(600),
            })
            .await;

        let json = response.json::<SendEmailResponse>();

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(json.results.len(), 1);
        assert_eq!(json.results[0].contact_id, 20);

        Ok(())
    }

    #[tokio::test]
    async fn test_execute_rule_with_no_recipients_returns_empty_results() -> TestResult {
        let mut rules = MockRuleActionService::new();

        rules
            .expect_execute()
            .returning(|_, _| Ok(SendReport::new()));

        let state = test_state(None, Some(rules));

        let response = TestServer::new(router(state))?
            .post("/api/v1/rules/3/execute")
            .json(&ExecuteRuleBody {
                contact_id: 7,
                case_id: None,
            })
            .await;

        let json = response.json::<SendEmailResponse>();

        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(json.results.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_execute_rule_not_found() -> TestResult {
        let mut rules = MockRuleActionService::new();

        rules.expect_execute().returning(|id, _| {
            Err(ExecuteRuleError::Store(RuleStoreError::RuleActionNotFound(
                id,
            )))
        });

        let state = test_state(None, Some(rules));

        let response = TestServer::new(router(state))?
            .post("/api/v1/rules/99/execute")
            .json(&ExecuteRuleBody {
                contact_id: 7,
                case_id: None,
            })
            .await;

        let json = response.json::<ErrorResponse>();

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(json.error, "Could not find rule action with ID: 99");

        Ok(())
    }
}
