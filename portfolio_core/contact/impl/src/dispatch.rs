use std::sync::Arc;

use chrono::{DateTime, Utc};
use portfolio_core_contact_contracts::dispatch::ContactDispatchService;
use portfolio_di::Build;
use portfolio_email_contracts::{Email, EmailBody, EmailService};
use portfolio_models::{contact::ContactMessage, email_address::EmailAddressWithName};
use portfolio_templates_contracts::{ContactMessageTemplate, TemplateService};
use portfolio_utils::trace_instrument;

#[derive(Debug, Clone, Build)]
pub struct ContactDispatchServiceImpl<Email, Template> {
    email: Email,
    template: Template,
    config: ContactDispatchConfig,
}

#[derive(Debug, Clone)]
pub struct ContactDispatchConfig {
    /// Inbox that receives all contact messages.
    pub recipient: Arc<EmailAddressWithName>,
}

impl<EmailS, Template> ContactDispatchService for ContactDispatchServiceImpl<EmailS, Template>
where
    EmailS: EmailService,
    Template: TemplateService,
{
    #[trace_instrument(skip(self, message))]
    async fn dispatch(
        &self,
        message: &ContactMessage,
        received_at: DateTime<Utc>,
    ) -> anyhow::Result<String> {
        let html = self.template.render(&ContactMessageTemplate {
            name: (*message.author.name).clone(),
            email: message.author.email.as_str().into(),
            subject: (*message.subject).clone(),
            message: (*message.content).clone(),
            received_at: format_received_at(received_at),
        })?;

        self.email
            .send(Email {
                sender_name: Some((*message.author.name).clone()),
                recipient: (*self.config.recipient).clone(),
                subject: format!("Portfolio Contact: {}", *message.subject),
                body: EmailBody {
                    text: text_body(message),
                    html: Some(html),
                },
                reply_to: Some(message.author.email.clone().into()),
            })
            .await
    }
}

fn text_body(message: &ContactMessage) -> String {
    format!(
        "Name: {}\nEmail: {}\nSubject: {}\n\nMessage:\n{}",
        *message.author.name, message.author.email, *message.subject, *message.content
    )
}

fn format_received_at(received_at: DateTime<Utc>) -> String {
    received_at
        .format("%A, %B %-d, %Y at %I:%M %p UTC")
        .to_string()
}

#[cfg(test)]
mod tests {
    use portfolio_demo::{
        contact::{JANE_MESSAGE, RECIPIENT},
        NOW,
    };
    use portfolio_email_contracts::MockEmailService;
    use portfolio_templates_contracts::MockTemplateService;
    use pretty_assertions::assert_eq;

    use super::*;

    const TEXT: &str = "Name: Jane Doe\nEmail: jane@example.com\nSubject: Hello there\n\nMessage:\nI would love to talk about a project.";

    fn template() -> ContactMessageTemplate {
        ContactMessageTemplate {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            subject: "Hello there".into(),
            message: "I would love to talk about a project.".into(),
            received_at: "Monday, January 6, 2025 at 02:30 PM UTC".into(),
        }
    }

    fn email() -> Email {
        Email {
            sender_name: Some("Jane Doe".into()),
            recipient: RECIPIENT.clone(),
            subject: "Portfolio Contact: Hello there".into(),
            body: EmailBody {
                text: TEXT.into(),
                html: Some("<p>rendered</p>".into()),
            },
            reply_to: Some("jane@example.com".parse().unwrap()),
        }
    }

    fn config() -> ContactDispatchConfig {
        ContactDispatchConfig {
            recipient: RECIPIENT.clone().into(),
        }
    }

    #[tokio::test]
    async fn ok() {
        // Arrange
        let template_service =
            MockTemplateService::new().with_render(template(), "<p>rendered</p>".into());
        let email_service = MockEmailService::new().with_send(email(), "abc123".into());

        let sut = ContactDispatchServiceImpl {
            email: email_service,
            template: template_service,
            config: config(),
        };

        // Act
        let result = sut.dispatch(&JANE_MESSAGE, *NOW).await;

        // Assert
        assert_eq!(result.unwrap(), "abc123");
    }

    #[tokio::test]
    async fn transport_error() {
        // Arrange
        let template_service =
            MockTemplateService::new().with_render(template(), "<p>rendered</p>".into());
        let email_service =
            MockEmailService::new().with_send_error(email(), "Connection refused");

        let sut = ContactDispatchServiceImpl {
            email: email_service,
            template: template_service,
            config: config(),
        };

        // Act
        let result = sut.dispatch(&JANE_MESSAGE, *NOW).await;

        // Assert
        assert_eq!(result.unwrap_err().to_string(), "Connection refused");
    }

    #[tokio::test]
    async fn template_error_does_not_send() {
        // Arrange
        let template_service = MockTemplateService::new().with_render_error(template());

        let sut = ContactDispatchServiceImpl {
            email: MockEmailService::new(),
            template: template_service,
            config: config(),
        };

        // Act
        let result = sut.dispatch(&JANE_MESSAGE, *NOW).await;

        // Assert
        result.unwrap_err();
    }

    #[test]
    fn received_at_format() {
        assert_eq!(
            format_received_at(*NOW),
            "Monday, January 6, 2025 at 02:30 PM UTC"
        );
        assert_eq!(text_body(&JANE_MESSAGE), TEXT);
    }
}
