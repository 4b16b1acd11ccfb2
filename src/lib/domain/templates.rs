//! Message templates: lookup and resolution.

mod store;
mod template;

pub mod errors;

pub use store::TemplateStore;
pub use template::{html_to_text, MessageTemplate, ResolvedTemplate};

/// Identifier of a message template
pub type TemplateId = i64;

#[cfg(test)]
pub mod tests {
    pub use super::store::MockTemplateStore;
}
