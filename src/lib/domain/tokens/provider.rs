//! Extension token providers.

use anyhow::Result;

use crate::domain::tokens::RecipientContext;

/// A named token-provider capability contributed by an extension.
///
/// Providers are queried in registration order during the provider pass of
/// rendering. A provider that fails is logged and skipped; it can never abort
/// a send.
pub trait TokenProvider: Send + Sync {
    /// The token category this provider serves, e.g. `survey` for
    /// `{survey.score}`.
    fn category(&self) -> &str;

    /// Resolve one field of this provider's category against the recipient
    /// context.
    ///
    /// # Returns
    /// `Ok(None)` when the field is unknown, leaving the token literal.
    fn resolve(&self, field: &str, context: &RecipientContext) -> Result<Option<String>>;
}
