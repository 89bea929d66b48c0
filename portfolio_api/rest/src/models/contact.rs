use portfolio_models::contact::{ContactField, ContactFieldError, ContactSubmission};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiContactMessageSent {
    pub success: bool,
    pub message: &'static str,
    pub message_id: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ApiContactValidationFailed {
    pub success: bool,
    pub message: &'static str,
    pub errors: Vec<ApiFieldError>,
}

#[derive(Debug, Serialize)]
pub struct ApiFieldError {
    pub field: ContactField,
    pub message: String,
}

impl From<ContactFieldError> for ApiFieldError {
    fn from(value: ContactFieldError) -> Self {
        Self {
            field: value.field(),
            message: value.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiContactDeliveryFailed {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiContactTestMessageSent {
    pub success: bool,
    pub message: &'static str,
    pub message_id: String,
    pub test_data: ContactSubmission,
}
