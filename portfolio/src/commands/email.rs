use clap::Subcommand;
use portfolio_config::Config;
use portfolio_email_contracts::{Email, EmailBody, EmailService};
use portfolio_models::email_address::EmailAddressWithName;
use tracing::info;

use crate::email;

#[derive(Debug, Subcommand)]
pub enum EmailCommand {
    /// Send a test email to the given recipient
    Test { recipient: EmailAddressWithName },
    /// Check the connection to the smtp server
    Ping,
}

impl EmailCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        match self {
            EmailCommand::Test { recipient } => test(config, recipient).await,
            EmailCommand::Ping => ping(config).await,
        }
    }
}

async fn test(config: Config, recipient: EmailAddressWithName) -> anyhow::Result<()> {
    let email_service = email::connect(&config.email);

    let message_id = email_service
        .send(Email {
            sender_name: None,
            recipient,
            subject: "Email Deliverability Test".into(),
            body: EmailBody {
                text: "Email deliverability seems to be working!".into(),
                html: None,
            },
            reply_to: None,
        })
        .await?;

    info!(%message_id, "Test email sent");
    println!("{message_id}");

    Ok(())
}

async fn ping(config: Config) -> anyhow::Result<()> {
    email::connect(&config.email).ping().await?;
    println!("Connected to smtp server");
    Ok(())
}
