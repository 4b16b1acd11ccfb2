//! Send email handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    domain::{
        batch::{sender_identity, EmailBatchService, SendEmailRequest, SendReport},
        communication::email_addresses::{parse_address_list, EmailAddress},
        rules::RuleActionService,
    },
    infrastructure::http::{errors::ApiError, state::AppState},
};

/// Send email request body
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SendEmailBody {
    /// The recipient contact ids
    #[schema(example = json!([12, 13]))]
    contact_ids: Vec<i64>,

    /// The message template to send
    #[schema(example = 42)]
    template_id: i64,

    /// Case providing extra token context; the activity is filed on it
    case_id: Option<i64>,

    /// Contribution providing extra token context
    contribution_id: Option<i64>,

    /// Activity providing extra token context
    activity_id: Option<i64>,

    /// The sender display name, required together with `from_email`
    #[schema(example = "Fundraising")]
    from_name: Option<String>,

    /// The sender address, required together with `from_name`
    #[schema(example = "team@example.org")]
    from_email: Option<String>,

    /// Comma or semicolon separated carbon-copy addresses
    cc: Option<String>,

    /// Comma or semicolon separated blind carbon-copy addresses
    bcc: Option<String>,

    /// Deliver every message here instead of to the recipients
    alternative_receiver_address: Option<String>,

    /// Use this location type's email instead of the primary one
    location_type_id: Option<i64>,
}

impl TryFrom<SendEmailBody> for SendEmailRequest {
    type Error = ApiError;

    fn try_from(body: SendEmailBody) -> Result<Self, Self::Error> {
        let mut request = SendEmailRequest::new(body.contact_ids, body.template_id)?;

        request.case_id = body.case_id;
        request.contribution_id = body.contribution_id;
        request.activity_id = body.activity_id;
        request.from = sender_identity(body.from_name.as_deref(), body.from_email.as_deref())?;
        request.location_type_id = body.location_type_id;

        if let Some(cc) = &body.cc {
            request.cc = parse_address_list(cc)?;
        }

        if let Some(bcc) = &body.bcc {
            request.bcc = parse_address_list(bcc)?;
        }

        request.override_address = body
            .alternative_receiver_address
            .as_deref()
            .map(EmailAddress::new)
            .transpose()?;

        Ok(request)
    }
}

/// The outcome for one dispatched recipient
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendOutcomeResponse {
    /// The recipient contact id
    #[schema(example = 12)]
    pub contact_id: i64,

    /// Whether the transport accepted the message
    pub delivered: bool,

    /// Human-readable status message
    #[schema(example = "Successfully sent e-mail to ana@example.com")]
    pub status: String,

    /// The audit activity created for a delivered message
    pub activity_id: Option<i64>,
}

/// Send email response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendEmailResponse {
    /// One entry per dispatched recipient; suppressed recipients get none
    pub results: Vec<SendOutcomeResponse>,
}

impl From<SendReport> for SendEmailResponse {
    fn from(report: SendReport) -> Self {
        Self {
            results: report
                .into_iter()
                .map(|(contact_id, outcome)| SendOutcomeResponse {
                    contact_id,
                    delivered: outcome.delivered,
                    status: outcome.status,
                    activity_id: outcome.activity_id,
                })
                .collect(),
        }
    }
}

/// Send a message template to a list of contacts
#[utoipa::path(
    post,
    operation_id = "send_email",
    tag = "Email",
    path = "/api/v1/email/send",
    request_body = SendEmailBody,
    responses(
        (status = StatusCode::OK, description = "Batch processed", body = SendEmailResponse),
        (status = StatusCode::UNPROCESSABLE_ENTITY, description = "Invalid request", body = ErrorResponse),
        (status = StatusCode::NOT_FOUND, description = "Template or contact not found", body = ErrorResponse),
        (status = StatusCode::BAD_GATEWAY, description = "The mail transport rejected a message", body = ErrorResponse),
        (status = StatusCode::GATEWAY_TIMEOUT, description = "Deadline exceeded", body = ErrorResponse),
        (status = StatusCode::TOO_MANY_REQUESTS, description = "Too many requests"),
    )
)]
pub async fn handler<B: EmailBatchService, R: RuleActionService>(
    State(state): State<AppState<B, R>>,
    request: Result<Json<SendEmailBody>, JsonRejection>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    let Json(body) = request?;

    let request: SendEmailRequest = body.try_into()?;

    let report = state.batch.send_batch(&request).await?;

    Ok(Json(report.into()))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use testresult::TestResult;

    use crate::{
        domain::{
            batch::{errors::SendBatchError, tests::MockEmailBatchService, SendOutcome},
            communication::mailer::MailerError,
            templates::errors::GetTemplateError,
        },
        infrastructure::http::{
            errors::ErrorResponse,
            handlers::v1::email::send::{SendEmailBody, SendEmailResponse},
            servers::https::router,
            state::tests::test_state,
        },
    };

    use super::*;

    fn body(contact_ids: Vec<i64>, template_id: i64) -> SendEmailBody {
        SendEmailBody {
            contact_ids,
            template_id,
            case_id: None,
            contribution_id: None,
            activity_id: None,
            from_name: None,
            from_email: None,
            cc: None,
            bcc: None,
            alternative_receiver_address: None,
            location_type_id: None,
        }
    }

    #[tokio::test]
    async fn test_send_email_success() -> TestResult {
        let mut batch = MockEmailBatchService::new();

        batch
            .expect_send_batch()
            .withf(|request: &SendEmailRequest| {
                request.recipients == vec![12] && request.template_id == 42
            })
            .returning(|_| {
                let mut report = SendReport::new();
                report.insert(
                    12,
                    SendOutcome {
                        delivered: true,
                        status: "Successfully sent e-mail to ana@example.com".to_string(),
                        activity_id: Some(901),
                    },
                );
                Ok(report)
            });

        let state = test_state(Some(batch), None);

        let response = TestServer::new(router(state))?
            .post("/api/v1/email/send")
            .json(&body(vec![12], 42))
            .await;

        let json = response.json::<SendEmailResponse>();

        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(json.results.len(), 1);
        assert_eq!(json.results[0].contact_id, 12);
        assert!(json.results[0].delivered);
        assert_eq!(json.results[0].activity_id, Some(901));

        Ok(())
    }

    #[tokio::test]
    async fn test_send_email_empty_recipients() -> TestResult {
        let state = test_state(None, None);

        let response = TestServer::new(router(state))?
            .post("/api/v1/email/send")
            .json(&body(vec![], 42))
            .await;

        let json = response.json::<ErrorResponse>();

        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json.error, "At least one recipient contact id is required");

        Ok(())
    }

    #[tokio::test]
    async fn test_send_email_incomplete_from_header() -> TestResult {
        let state = test_state(None, None);

        let mut request_body = body(vec![12], 42);
        request_body.from_name = Some("Fundraising".to_string());

        let response = TestServer::new(router(state))?
            .post("/api/v1/email/send")
            .json(&request_body)
            .await;

        let json = response.json::<ErrorResponse>();

        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json.error, "You have to provide both from_name and from_email");

        Ok(())
    }

    #[tokio::test]
    async fn test_send_email_unknown_template() -> TestResult {
        let mut batch = MockEmailBatchService::new();

        batch.expect_send_batch().returning(|_| {
            Err(SendBatchError::Template(GetTemplateError::TemplateNotFound(
                99,
            )))
        });

        let state = test_state(Some(batch), None);

        let response = TestServer::new(router(state))?
            .post("/api/v1/email/send")
            .json(&body(vec![12], 99))
            .await;

        let json = response.json::<ErrorResponse>();

        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(json.error, "Could not find template with ID: 99");

        Ok(())
    }

    #[tokio::test]
    async fn test_send_email_delivery_failure() -> TestResult {
        let mut batch = MockEmailBatchService::new();

        batch.expect_send_batch().returning(|_| {
            Err(SendBatchError::Delivery {
                contact_id: 2,
                to: "broken@example.com".to_string(),
                source: MailerError::SendError,
            })
        });

        let state = test_state(Some(batch), None);

        let response = TestServer::new(router(state))?
            .post("/api/v1/email/send")
            .json(&body(vec![1, 2, 3], 42))
            .await;

        let json = response.json::<ErrorResponse>();

        assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            json.error,
            "Error sending e-mail to broken@example.com (contact 2)"
        );

        Ok(())
    }
}
