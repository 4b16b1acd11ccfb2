//! Error types for template lookup and resolution

use thiserror::Error;

use crate::domain::templates::TemplateId;

/// Errors that can occur when looking up a template
#[derive(Debug, Error)]
pub enum GetTemplateError {
    /// No active template exists with the given id
    #[error("Could not find template with ID: {0}")]
    TemplateNotFound(TemplateId),

    /// Unknown error
    #[error(transparent)]
    UnknownError(#[from] anyhow::Error),
}

/// Errors that can occur when resolving a template for sending
#[derive(Debug, Error)]
pub enum ResolveTemplateError {
    /// The template has neither an HTML nor a text body
    #[error("Template {0} has no HTML or text body")]
    EmptyTemplate(TemplateId),
}
