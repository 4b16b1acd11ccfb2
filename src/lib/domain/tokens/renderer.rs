//! The token substitution pipeline.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use handlebars::Handlebars;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::warn;

use crate::domain::{
    templates::ResolvedTemplate,
    tokens::{RecipientContext, RenderedMessage, TokenProvider},
};

lazy_static! {
    static ref TOKEN: Regex = Regex::new(r"\{([a-z_][a-z0-9_]*)\.([A-Za-z0-9_]+)\}").unwrap();
}

/// Categories handled by the renderer's own passes; the component and
/// provider passes never touch these.
const RESERVED_CATEGORIES: [&str; 5] = ["domain", "contact", "case", "contribution", "activity"];

/// Greeting fields, substituted in the final contact pass rather than the
/// first one.
const GREETING_FIELDS: [&str; 3] = ["email_greeting", "postal_greeting", "addressee"];

/// Renderer configuration.
#[derive(Clone, Debug, Default)]
pub struct RendererConfig {
    /// Values for `{domain.*}` tokens (organisation name, address, ...)
    pub domain_tokens: HashMap<String, String>,

    /// Run the rendered output through a final Handlebars pass with the
    /// contact attributes as scope
    pub secondary_pass: bool,
}

/// Expands subject, HTML and text templates against a per-recipient context.
///
/// Substitution happens in a fixed order: domain, contact, component values
/// embedded in contact data, registered providers, case, contribution,
/// activity, then greetings last. Unresolved tokens stay literal. Rendering
/// is pure: the same template and context always produce the same output.
pub struct TokenRenderer {
    config: RendererConfig,
    providers: Vec<Arc<dyn TokenProvider>>,
    // Provider categories, resolved once on first render.
    categories: OnceLock<Vec<String>>,
    handlebars: Handlebars<'static>,
}

impl fmt::Debug for TokenRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRenderer")
            .field("config", &self.config)
            .field("providers", &self.providers.len())
            .finish()
    }
}

impl TokenRenderer {
    /// Create a renderer with no providers registered.
    pub fn new(config: RendererConfig) -> Self {
        Self {
            config,
            providers: Vec::new(),
            categories: OnceLock::new(),
            handlebars: Handlebars::new(),
        }
    }

    /// Register a token provider. Providers are queried in registration
    /// order; registration is only possible before the first render.
    pub fn register_provider(&mut self, provider: Arc<dyn TokenProvider>) {
        self.providers.push(provider);
    }

    /// Render all three template parts for one recipient.
    pub fn render(&self, template: &ResolvedTemplate, context: &RecipientContext) -> RenderedMessage {
        RenderedMessage {
            subject: self.render_part(&template.subject, context),
            html: template
                .html
                .as_ref()
                .map(|html| self.render_part(html, context)),
            text: self.render_part(&template.text, context),
        }
    }

    fn render_part(&self, part: &str, context: &RecipientContext) -> String {
        let text = substitute(part, |category, field| {
            (category == "domain")
                .then(|| self.config.domain_tokens.get(field).cloned())
                .flatten()
        });

        let text = substitute(&text, |category, field| {
            (category == "contact" && !GREETING_FIELDS.contains(&field))
                .then(|| contact_value(context, field))
                .flatten()
        });

        let text = substitute(&text, |category, field| {
            self.component_value(context, category, field)
        });

        let text = substitute(&text, |category, field| {
            self.provider_value(context, category, field)
        });

        let text = substitute(&text, |category, field| {
            (category == "case")
                .then(|| context.case.as_ref()?.get(field).cloned())
                .flatten()
        });

        let text = substitute(&text, |category, field| {
            (category == "contribution")
                .then(|| context.contribution.as_ref()?.get(field).cloned())
                .flatten()
        });

        let text = substitute(&text, |category, field| {
            (category == "activity")
                .then(|| context.activity.as_ref()?.get(field).cloned())
                .flatten()
        });

        let text = substitute(&text, |category, field| {
            (category == "contact" && GREETING_FIELDS.contains(&field))
                .then(|| greeting_value(context, field))
                .flatten()
        });

        if self.config.secondary_pass {
            self.secondary_pass(&text, context)
        } else {
            text
        }
    }

    /// Component values (event, membership, ...) live in the contact
    /// attribute map under dotted keys.
    fn component_value(
        &self,
        context: &RecipientContext,
        category: &str,
        field: &str,
    ) -> Option<String> {
        if RESERVED_CATEGORIES.contains(&category) {
            return None;
        }

        context
            .contact
            .attributes
            .get(&format!("{category}.{field}"))
            .cloned()
    }

    fn provider_value(
        &self,
        context: &RecipientContext,
        category: &str,
        field: &str,
    ) -> Option<String> {
        if !self.provider_categories().iter().any(|c| c == category) {
            return None;
        }

        for provider in &self.providers {
            if provider.category() != category {
                continue;
            }

            match provider.resolve(field, context) {
                Ok(Some(value)) => return Some(value),
                Ok(None) => {}
                Err(err) => {
                    warn!(category, field, error = %err, "token provider failed, skipping");
                }
            }
        }

        None
    }

    fn provider_categories(&self) -> &[String] {
        self.categories.get_or_init(|| {
            self.providers
                .iter()
                .map(|provider| provider.category().to_string())
                .collect()
        })
    }

    fn secondary_pass(&self, text: &str, context: &RecipientContext) -> String {
        match self
            .handlebars
            .render_template(text, &context.contact.attributes)
        {
            Ok(rendered) => rendered,
            Err(err) => {
                warn!(error = %err, "secondary templating pass failed, keeping token output");
                text.to_string()
            }
        }
    }
}

fn substitute(text: &str, resolve: impl Fn(&str, &str) -> Option<String>) -> String {
    TOKEN
        .replace_all(text, |caps: &Captures<'_>| {
            resolve(&caps[1], &caps[2]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn contact_value(context: &RecipientContext, field: &str) -> Option<String> {
    let contact = &context.contact;

    match field {
        "contact_id" | "id" => Some(contact.id.to_string()),
        "display_name" => Some(contact.display_name.clone()),
        "email" => contact.email.as_ref().map(|email| email.to_string()),
        _ => contact.attributes.get(field).cloned(),
    }
}

fn greeting_value(context: &RecipientContext, field: &str) -> Option<String> {
    let contact = &context.contact;

    match field {
        "email_greeting" => contact.email_greeting.clone(),
        "postal_greeting" => contact.postal_greeting.clone(),
        "addressee" => contact.addressee.clone(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;

    use crate::domain::{communication::email_addresses::EmailAddress, contacts::Contact};

    use super::*;

    struct StaticProvider {
        category: &'static str,
        field: &'static str,
        value: &'static str,
    }

    impl TokenProvider for StaticProvider {
        fn category(&self) -> &str {
            self.category
        }

        fn resolve(&self, field: &str, _context: &RecipientContext) -> anyhow::Result<Option<String>> {
            Ok((field == self.field).then(|| self.value.to_string()))
        }
    }

    struct FailingProvider;

    impl TokenProvider for FailingProvider {
        fn category(&self) -> &str {
            "survey"
        }

        fn resolve(&self, _field: &str, _context: &RecipientContext) -> anyhow::Result<Option<String>> {
            Err(anyhow!("backend unavailable"))
        }
    }

    fn template(subject: &str, html: Option<&str>, text: &str) -> ResolvedTemplate {
        ResolvedTemplate {
            id: 1,
            subject: subject.to_string(),
            html: html.map(str::to_string),
            text: text.to_string(),
        }
    }

    fn context() -> RecipientContext {
        let mut contact = Contact {
            id: 12,
            display_name: "Ana Pereira".to_string(),
            email: Some(EmailAddress::new_unchecked("ana@example.com")),
            email_greeting: Some("Dear Ana".to_string()),
            ..Contact::default()
        };
        contact
            .attributes
            .insert("first_name".to_string(), "Ana".to_string());
        contact
            .attributes
            .insert("event.title".to_string(), "Spring Gala".to_string());

        RecipientContext::for_contact(contact)
    }

    fn renderer() -> TokenRenderer {
        let mut config = RendererConfig::default();
        config
            .domain_tokens
            .insert("name".to_string(), "Example Org".to_string());

        TokenRenderer::new(config)
    }

    #[test]
    fn test_contact_and_domain_tokens() {
        let message = renderer().render(
            &template(
                "Hi {contact.first_name}",
                Some("<p>{contact.display_name}, from {domain.name}</p>"),
                "{contact.display_name}, from {domain.name}",
            ),
            &context(),
        );

        assert_eq!(message.subject, "Hi Ana");
        assert_eq!(
            message.html.as_deref(),
            Some("<p>Ana Pereira, from Example Org</p>")
        );
        assert_eq!(message.text, "Ana Pereira, from Example Org");
    }

    #[test]
    fn test_unresolved_tokens_stay_literal() {
        let message = renderer().render(
            &template("Hi {contact.nickname}", None, "{case.subject} pending"),
            &context(),
        );

        assert_eq!(message.subject, "Hi {contact.nickname}");
        assert_eq!(message.text, "{case.subject} pending");
    }

    #[test]
    fn test_component_tokens_come_from_contact_attributes() {
        let message = renderer().render(
            &template("See you at {event.title}", None, "{event.title}"),
            &context(),
        );

        assert_eq!(message.subject, "See you at Spring Gala");
    }

    #[test]
    fn test_case_tokens_substituted_when_context_present() {
        let mut context = context();
        let mut case = HashMap::new();
        case.insert("subject".to_string(), "Housing application".to_string());
        context.case = Some(case);

        let message = renderer().render(
            &template("Re: {case.subject}", None, "{case.subject}"),
            &context,
        );

        assert_eq!(message.subject, "Re: Housing application");
    }

    #[test]
    fn test_greetings_render_last() {
        let message = renderer().render(
            &template("{contact.email_greeting}", None, "{contact.email_greeting},"),
            &context(),
        );

        assert_eq!(message.subject, "Dear Ana");
        assert_eq!(message.text, "Dear Ana,");
    }

    #[test]
    fn test_provider_tokens_resolved_in_registration_order() {
        let mut renderer = renderer();
        renderer.register_provider(Arc::new(StaticProvider {
            category: "survey",
            field: "score",
            value: "87",
        }));

        let message = renderer.render(
            &template("Score: {survey.score}", None, "{survey.score}"),
            &context(),
        );

        assert_eq!(message.subject, "Score: 87");
    }

    #[test]
    fn test_failing_provider_is_skipped_not_fatal() {
        let mut renderer = renderer();
        renderer.register_provider(Arc::new(FailingProvider));

        let message = renderer.render(
            &template("Score: {survey.score}", None, "{survey.score}"),
            &context(),
        );

        assert_eq!(message.subject, "Score: {survey.score}");
    }

    #[test]
    fn test_secondary_pass_renders_contact_scope() {
        let mut config = RendererConfig::default();
        config.secondary_pass = true;

        let renderer = TokenRenderer::new(config);

        let message = renderer.render(
            &template("Hello {{first_name}}", None, "Hello {{first_name}}"),
            &context(),
        );

        assert_eq!(message.subject, "Hello Ana");
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let renderer = renderer();
        let template = template(
            "Hi {contact.first_name}",
            Some("<p>{contact.display_name} & {domain.name}</p>"),
            "{contact.display_name}",
        );
        let context = context();

        let first = renderer.render(&template, &context);
        let second = renderer.render(&template, &context);

        assert_eq!(first, second);
    }
}
