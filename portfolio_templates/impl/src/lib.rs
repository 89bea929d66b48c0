use std::sync::Arc;

use portfolio_di::Build;
use portfolio_templates_contracts::{Template, TemplateService, BASE_TEMPLATE, TEMPLATES};
use portfolio_utils::trace_instrument;
use tera::Tera;

#[derive(Debug, Clone, Build)]
pub struct TemplateServiceImpl {
    #[state]
    state: State,
}

#[derive(Debug, Clone)]
struct State(Arc<Tera>);

impl Default for State {
    fn default() -> Self {
        let mut tera = Tera::default();

        // The templates are compiled into the binary and covered by the tests
        // below, so a parse error here is a programming error.
        tera.add_raw_templates(std::iter::once(BASE_TEMPLATE).chain(TEMPLATES.iter().copied()))
            .unwrap();

        Self(tera.into())
    }
}

impl TemplateService for TemplateServiceImpl {
    #[trace_instrument(skip(self, template), fields(template = T::NAME))]
    fn render<T: Template>(&self, template: &T) -> anyhow::Result<String> {
        let context = tera::Context::from_serialize(template)?;
        self.state.0.render(T::NAME, &context).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use portfolio_templates_contracts::ContactMessageTemplate;
    use pretty_assertions::assert_eq;

    use super::*;

    fn make_sut() -> TemplateServiceImpl {
        TemplateServiceImpl {
            state: Default::default(),
        }
    }

    fn contact_message() -> ContactMessageTemplate {
        ContactMessageTemplate {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            subject: "Hello there".into(),
            message: "This is a test message.".into(),
            received_at: "Monday, January 6, 2025 at 02:30 PM UTC".into(),
        }
    }

    #[test]
    fn contact_message_contains_fields() {
        // Arrange
        let sut = make_sut();

        // Act
        let result = sut.render(&contact_message()).unwrap();

        // Assert
        assert!(result.starts_with("<!DOCTYPE html>"));
        for needle in [
            "Jane Doe",
            "mailto:jane@example.com",
            "Hello there",
            "This is a test message.",
            "Received on Monday, January 6, 2025 at 02:30 PM UTC",
        ] {
            assert!(result.contains(needle), "{needle:?} missing");
        }
    }

    #[test]
    fn contact_message_escapes_html() {
        // Arrange
        let sut = make_sut();
        let template = ContactMessageTemplate {
            subject: "<b>Hi</b> & bye".into(),
            message: "<script>alert(1)</script>".into(),
            ..contact_message()
        };

        // Act
        let result = sut.render(&template).unwrap();

        // Assert
        assert!(!result.contains("<script>"));
        assert!(!result.contains("<b>Hi</b>"));
        assert!(result.contains("&lt;script&gt;"));
        assert!(result.contains("&amp; bye"));
    }

    #[test]
    fn rendering_is_pure() {
        let sut = make_sut();
        assert_eq!(
            sut.render(&contact_message()).unwrap(),
            sut.render(&contact_message()).unwrap()
        );
    }
}
