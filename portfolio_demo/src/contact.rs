use std::sync::LazyLock;

use portfolio_models::{
    contact::{ContactMessage, ContactMessageAuthor, ContactSubmission},
    email_address::EmailAddressWithName,
};

pub static RECIPIENT: LazyLock<EmailAddressWithName> =
    LazyLock::new(|| "Aditya Gupta <owner@example.com>".parse().unwrap());

pub static JANE: LazyLock<ContactSubmission> = LazyLock::new(|| ContactSubmission {
    name: "Jane Doe".into(),
    email: "jane@example.com".into(),
    subject: "Hello there".into(),
    message: "I would love to talk about a project.".into(),
});

pub static JANE_MESSAGE: LazyLock<ContactMessage> = LazyLock::new(|| ContactMessage {
    author: ContactMessageAuthor {
        name: "Jane Doe".try_into().unwrap(),
        email: "jane@example.com".parse().unwrap(),
    },
    subject: "Hello there".try_into().unwrap(),
    content: "I would love to talk about a project.".try_into().unwrap(),
});

/// Violates every rule except the email one.
pub static INVALID: LazyLock<ContactSubmission> = LazyLock::new(|| ContactSubmission {
    name: "J".into(),
    email: "jane@example.com".into(),
    subject: "Hi".into(),
    message: "Short".into(),
});
