use std::sync::Arc;

use anyhow::{anyhow, Context};
use lettre::{
    message::{header, Mailbox, MessageBuilder, MultiPart},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use portfolio_email_contracts::{Email, EmailService};
use portfolio_models::email_address::EmailAddressWithName;
use portfolio_utils::{trace_instrument, Apply};
use tokio::sync::OnceCell;
use tracing::debug;
use uuid::Uuid;

type Transport = AsyncSmtpTransport<Tokio1Executor>;

/// Sends emails via smtp.
///
/// The transport is created on first use and shared by all clones, so
/// constructing the service never touches the network and a broken smtp url
/// only affects the requests that actually need to send mail.
#[derive(Debug, Clone)]
pub struct EmailServiceImpl {
    smtp_url: Arc<str>,
    from: EmailAddressWithName,
    transport: Arc<OnceCell<Transport>>,
}

impl EmailServiceImpl {
    pub fn new(smtp_url: &str, from: EmailAddressWithName) -> Self {
        Self {
            smtp_url: smtp_url.into(),
            from,
            transport: Default::default(),
        }
    }

    async fn transport(&self) -> anyhow::Result<&Transport> {
        self.transport
            .get_or_try_init(|| async {
                debug!("creating smtp transport");
                Transport::from_url(&self.smtp_url)
                    .map(|builder| builder.build())
                    .context("Invalid smtp url")
            })
            .await
    }

    fn build_message(&self, email: Email, message_id: String) -> anyhow::Result<Message> {
        let from = Mailbox {
            name: email.sender_name.or_else(|| self.from.name().map(Into::into)),
            email: self.from.email().clone(),
        };

        let builder = Message::builder()
            .from(from)
            .to(email.recipient.0)
            .apply_map(email.reply_to.map(|x| x.0), MessageBuilder::reply_to)
            .subject(email.subject)
            .message_id(Some(message_id));

        match email.body.html {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(email.body.text, html)),
            None => builder
                .header(header::ContentType::TEXT_PLAIN)
                .body(email.body.text),
        }
        .context("Failed to build email message")
    }
}

impl EmailService for EmailServiceImpl {
    #[trace_instrument(skip(self, email), fields(subject = %email.subject))]
    async fn send(&self, email: Email) -> anyhow::Result<String> {
        let message_id = format!("<{}@{}>", Uuid::new_v4(), self.from.email().domain());
        let message = self.build_message(email, message_id.clone())?;

        let response = self
            .transport()
            .await?
            .send(message)
            .await
            .context("Failed to send email")?;

        if !response.is_positive() {
            return Err(anyhow!(
                "Smtp server rejected the email: {}",
                response.code()
            ));
        }

        Ok(message_id)
    }

    #[trace_instrument(skip(self))]
    async fn ping(&self) -> anyhow::Result<()> {
        self.transport()
            .await?
            .test_connection()
            .await?
            .then_some(())
            .ok_or_else(|| anyhow!("Failed to ping smtp server"))
    }
}

#[cfg(test)]
mod tests {
    use lettre::message::Mailboxes;
    use portfolio_email_contracts::EmailBody;
    use pretty_assertions::assert_eq;

    use super::*;

    fn sut(smtp_url: &str) -> EmailServiceImpl {
        EmailServiceImpl::new(smtp_url, "Portfolio <portfolio@example.com>".parse().unwrap())
    }

    fn email(html: Option<&str>) -> Email {
        Email {
            sender_name: Some("Jane Doe".into()),
            recipient: "owner@example.com".parse().unwrap(),
            subject: "Portfolio Contact: Hello there".into(),
            body: EmailBody {
                text: "Hello".into(),
                html: html.map(Into::into),
            },
            reply_to: Some("jane@example.com".parse().unwrap()),
        }
    }

    #[test]
    fn build_message_headers() {
        let message = sut("smtp://localhost")
            .build_message(email(None), "<id@example.com>".into())
            .unwrap();
        let headers = message.headers();

        let from = Mailboxes::from(headers.get::<header::From>().unwrap());
        let from = from.iter().next().unwrap();
        assert_eq!(from.name.as_deref(), Some("Jane Doe"));
        assert_eq!(from.email.to_string(), "portfolio@example.com");

        let reply_to = Mailboxes::from(headers.get::<header::ReplyTo>().unwrap());
        assert_eq!(
            reply_to.iter().next().unwrap().email.to_string(),
            "jane@example.com"
        );
        assert_eq!(
            headers.get_raw("Message-ID"),
            Some("<id@example.com>")
        );
    }

    #[test]
    fn build_message_falls_back_to_configured_name() {
        let message = sut("smtp://localhost")
            .build_message(
                Email {
                    sender_name: None,
                    ..email(Some("<p>Hello</p>"))
                },
                "<id@example.com>".into(),
            )
            .unwrap();

        let from = Mailboxes::from(message.headers().get::<header::From>().unwrap());
        assert_eq!(from.iter().next().unwrap().name.as_deref(), Some("Portfolio"));
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("multipart/alternative"));
    }

    #[tokio::test]
    async fn transport_is_created_once() {
        let sut = sut("smtp://localhost");
        let clones = vec![sut.clone(); 8];

        let transports = futures::future::join_all(
            std::iter::once(&sut)
                .chain(&clones)
                .map(EmailServiceImpl::transport),
        )
        .await;

        let first = *transports[0].as_ref().unwrap();
        for transport in &transports {
            assert!(std::ptr::eq(*transport.as_ref().unwrap(), first));
        }
    }

    #[tokio::test]
    async fn invalid_url_fails_on_use() {
        let sut = sut("not a url");

        assert!(sut.ping().await.is_err());
        assert!(sut.send(email(None)).await.is_err());
    }

    #[tokio::test]
    async fn ping_unreachable_server() {
        let sut = sut("smtp://127.0.0.1:1");

        assert!(sut.ping().await.is_err());
    }
}
