use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing, Extension, Json, Router,
};
use portfolio_core_contact_contracts::{
    ContactDelivery, ContactFeatureService, ContactSendMessageError, ContactSendTestMessageError,
    ContactTestDelivery,
};
use portfolio_models::contact::ContactSubmission;
use portfolio_utils::humanize_duration;
use tracing::{debug, error};

use crate::{
    errors::internal_server_error,
    middlewares::{client_ip::ClientIp, rate_limit},
    models::{
        contact::{
            ApiContactDeliveryFailed, ApiContactMessageSent, ApiContactTestMessageSent,
            ApiContactValidationFailed,
        },
        timestamp, ApiRateLimited,
    },
};

struct ContactState<Contact> {
    service: Arc<Contact>,
    development: bool,
}

impl<Contact> Clone for ContactState<Contact> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            development: self.development,
        }
    }
}

pub fn router<Contact: ContactFeatureService>(
    service: Arc<Contact>,
    development: bool,
) -> Router<()> {
    let router = Router::new().route("/send", routing::post(send_message::<Contact>));

    let router = if development {
        router.route("/test", routing::post(send_test_message::<Contact>))
    } else {
        router
    };

    Router::new().nest(
        "/api/contact",
        router.with_state(ContactState {
            service,
            development,
        }),
    )
}

async fn send_message<Contact: ContactFeatureService>(
    State(state): State<ContactState<Contact>>,
    Extension(ClientIp(client_ip)): Extension<ClientIp>,
    submission: Result<Json<ContactSubmission>, JsonRejection>,
) -> Response {
    let submission = match submission {
        Ok(Json(submission)) => submission,
        Err(rejection) => {
            debug!(%rejection, "invalid contact request body");
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiContactValidationFailed {
                    success: false,
                    message: "Invalid request body",
                    errors: Vec::new(),
                }),
            )
                .into_response();
        }
    };

    match state.service.send_message(client_ip, submission).await {
        Ok(ContactDelivery {
            message_id,
            sent_at,
        }) => Json(ApiContactMessageSent {
            success: true,
            message: "Your message has been sent successfully!",
            message_id,
            timestamp: timestamp(sent_at),
        })
        .into_response(),
        Err(ContactSendMessageError::Validation(errors)) => (
            StatusCode::BAD_REQUEST,
            Json(ApiContactValidationFailed {
                success: false,
                message: "Validation failed",
                errors: errors.into_iter().map(Into::into).collect(),
            }),
        )
            .into_response(),
        Err(ContactSendMessageError::RateLimited { window, decision }) => (
            StatusCode::TOO_MANY_REQUESTS,
            rate_limit::headers(&decision),
            rate_limit::retry_after_header(&decision),
            Json(ApiRateLimited {
                error: "Too many contact form submissions. Please try again later.",
                retry_after: humanize_duration(window),
            }),
        )
            .into_response(),
        Err(ContactSendMessageError::Delivery(err)) => {
            error!("Failed to send contact message: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiContactDeliveryFailed {
                    success: false,
                    message: "Failed to send message. Please try again later.",
                    error: state.development.then(|| format!("{err:#}")),
                    timestamp: Some(timestamp(chrono::Utc::now())),
                }),
            )
                .into_response()
        }
    }
}

async fn send_test_message<Contact: ContactFeatureService>(
    State(state): State<ContactState<Contact>>,
) -> Response {
    match state.service.send_test_message().await {
        Ok(ContactTestDelivery {
            delivery,
            submission,
        }) => Json(ApiContactTestMessageSent {
            success: true,
            message: "Test email sent successfully",
            message_id: delivery.message_id,
            test_data: submission,
        })
        .into_response(),
        Err(ContactSendTestMessageError::Delivery(err)) => {
            error!("Failed to send test message: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiContactDeliveryFailed {
                    success: false,
                    message: "Test email failed",
                    error: Some(format!("{err:#}")),
                    timestamp: None,
                }),
            )
                .into_response()
        }
        Err(ContactSendTestMessageError::Other(err)) => {
            internal_server_error(err, state.development)
        }
    }
}
