use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{email_address::EmailAddress, macros::nutype_string};

/// A message that passed validation and can be handed to the mail dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub author: ContactMessageAuthor,
    pub subject: ContactMessageSubject,
    pub content: ContactMessageContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessageAuthor {
    pub name: ContactMessageAuthorName,
    pub email: EmailAddress,
}

// ASCII only, internationalized names are not supported yet.
pub static CONTACT_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z\s\-'.]+$").unwrap());

nutype_string!(ContactMessageAuthorName(
    sanitize(trim),
    validate(len_char_min = 2, len_char_max = 100, regex = CONTACT_NAME_REGEX)
));

nutype_string!(ContactMessageSubject(
    sanitize(trim),
    validate(len_char_min = 5, len_char_max = 200)
));

nutype_string!(ContactMessageContent(
    sanitize(trim),
    validate(len_char_min = 10, len_char_max = 2000)
));

/// The raw contact form as submitted by a visitor.
///
/// Missing fields deserialize to empty strings, so they are reported by
/// [`ContactSubmission::validate`] instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactField {
    Name,
    Email,
    Subject,
    Message,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ContactFieldError {
    #[error("Name must be between 2 and 100 characters")]
    NameLength,
    #[error("Name contains invalid characters")]
    NameCharacters,
    #[error("Please provide a valid email address")]
    InvalidEmail,
    #[error("Subject must be between 5 and 200 characters")]
    SubjectLength,
    #[error("Message must be between 10 and 2000 characters")]
    MessageLength,
}

impl ContactFieldError {
    pub fn field(self) -> ContactField {
        match self {
            Self::NameLength | Self::NameCharacters => ContactField::Name,
            Self::InvalidEmail => ContactField::Email,
            Self::SubjectLength => ContactField::Subject,
            Self::MessageLength => ContactField::Message,
        }
    }
}

impl ContactSubmission {
    /// Validates every field and returns either the sanitized message or all
    /// violated constraints, in field order.
    pub fn validate(self) -> Result<ContactMessage, Vec<ContactFieldError>> {
        let mut errors = Vec::new();

        let name = ContactMessageAuthorName::try_new(self.name.clone())
            .inspect_err(|_| {
                let name = self.name.trim();
                if !(2..=100).contains(&name.chars().count()) {
                    errors.push(ContactFieldError::NameLength);
                }
                if !CONTACT_NAME_REGEX.is_match(name) {
                    errors.push(ContactFieldError::NameCharacters);
                }
            })
            .ok();

        let email = parse_email(&self.email);
        if email.is_none() {
            errors.push(ContactFieldError::InvalidEmail);
        }

        let subject = ContactMessageSubject::try_new(self.subject)
            .inspect_err(|_| errors.push(ContactFieldError::SubjectLength))
            .ok();

        let content = ContactMessageContent::try_new(self.message)
            .inspect_err(|_| errors.push(ContactFieldError::MessageLength))
            .ok();

        match (name, email, subject, content) {
            (Some(name), Some(email), Some(subject), Some(content)) if errors.is_empty() => {
                Ok(ContactMessage {
                    author: ContactMessageAuthor { name, email },
                    subject,
                    content,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Parses and normalizes an address. The domain must be a fully qualified
/// host name, ip addresses and address literals are rejected.
fn parse_email(email: &str) -> Option<EmailAddress> {
    email
        .trim()
        .to_lowercase()
        .parse::<EmailAddress>()
        .ok()
        .filter(|email| is_host_name(email.domain()))
}

fn is_host_name(domain: &str) -> bool {
    let labels = domain.split('.').collect::<Vec<_>>();
    let [.., tld] = labels.as_slice() else {
        return false;
    };

    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}
