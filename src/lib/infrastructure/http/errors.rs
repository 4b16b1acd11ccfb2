//! API error-handling module

use std::fmt;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    batch::errors::{SendBatchError, ValidationError},
    communication::email_addresses::EmailAddressError,
    contacts::errors::DirectoryError,
    rules::errors::{ConfigError, ExecuteRuleError, RuleStoreError},
    templates::errors::GetTemplateError,
};

/// An error response
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// The error message
    #[schema(example = "Internal server error")]
    pub error: String,
}

/// An error raised in the API
#[derive(Debug, Deserialize, ToSchema)]
pub struct ApiError {
    /// The status code
    #[schema(example = 500, value_type = u16)]
    #[serde(with = "http_serde::status_code")]
    pub status: StatusCode,

    /// The error message
    #[schema(example = "Internal server error")]
    pub message: String,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            message: message.to_string(),
        }
    }

    /// Create a new not found error
    pub fn new_404(message: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.to_string(),
        }
    }

    /// Create a new unprocessable entity error
    pub fn new_422(message: &str) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.to_string(),
        }
    }

    /// Create new internal server error
    pub fn new_500(message: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<EmailAddressError> for ApiError {
    fn from(err: EmailAddressError) -> Self {
        match err {
            EmailAddressError::EmptyEmailAddress => {
                ApiError::new_422("Please provide an email address")
            }
            EmailAddressError::InvalidEmailAddress(address) => {
                ApiError::new_422(&format!("\"{address}\" is not a valid email address"))
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidAddress(err) => err.into(),
            err => ApiError::new_422(&err.to_string()),
        }
    }
}

impl From<GetTemplateError> for ApiError {
    fn from(err: GetTemplateError) -> Self {
        match err {
            GetTemplateError::TemplateNotFound(_) => ApiError::new_404(&err.to_string()),
            GetTemplateError::UnknownError(err) => unknown_error(Some(err.to_string())),
        }
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::ContactNotFound(_) | DirectoryError::EntityNotFound { .. } => {
                ApiError::new_404(&err.to_string())
            }
            DirectoryError::UnknownError(err) => unknown_error(Some(err.to_string())),
        }
    }
}

impl From<SendBatchError> for ApiError {
    fn from(err: SendBatchError) -> Self {
        match err {
            SendBatchError::Validation(err) => err.into(),
            SendBatchError::Template(err) => err.into(),
            SendBatchError::EmptyTemplate(err) => ApiError::new_422(&err.to_string()),
            SendBatchError::Directory(err) => err.into(),
            err @ SendBatchError::Delivery { .. } => {
                ApiError::new(StatusCode::BAD_GATEWAY, &err.to_string())
            }
            err @ SendBatchError::AuditWrite { .. } => ApiError::new_500(&err.to_string()),
            SendBatchError::DeadlineExceeded => ApiError::new(
                StatusCode::GATEWAY_TIMEOUT,
                &SendBatchError::DeadlineExceeded.to_string(),
            ),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new_422(&err.to_string())
    }
}

impl From<RuleStoreError> for ApiError {
    fn from(err: RuleStoreError) -> Self {
        match err {
            RuleStoreError::RuleActionNotFound(_) => ApiError::new_404(&err.to_string()),
            RuleStoreError::UnknownError(err) => unknown_error(Some(err.to_string())),
        }
    }
}

impl From<ExecuteRuleError> for ApiError {
    fn from(err: ExecuteRuleError) -> Self {
        match err {
            ExecuteRuleError::Config(err) => err.into(),
            ExecuteRuleError::Store(err) => err.into(),
            ExecuteRuleError::Directory(err) => err.into(),
            ExecuteRuleError::Send(err) => err.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(rejection.status(), &rejection.body_text())
    }
}

fn unknown_error(message: Option<String>) -> ApiError {
    if let Some(message) = message {
        ApiError::new_500(&message)
    } else {
        ApiError::new_500("An unknown error occurred, please try again")
    }
}
