//! OpenAPI module

use utoipa::OpenApi;

use crate::infrastructure::http::{errors::ErrorResponse, handlers::v1::*};

#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "Mailroom"),
    paths(
        email::send::handler,
        rules::configure::handler,
        rules::fetch::handler,
        rules::execute::handler,
        uptime::handler
    ),
    components(schemas(
        email::send::SendEmailBody,
        email::send::SendEmailResponse,
        email::send::SendOutcomeResponse,
        rules::configure::RuleConfigurationBody,
        rules::fetch::RuleConfigurationResponse,
        rules::execute::ExecuteRuleBody,
        uptime::UptimeResponse,
        ErrorResponse,
    ))
)]
pub struct ApiDocs;
