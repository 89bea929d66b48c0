use portfolio_core_health_contracts::{HealthStatus, MockHealthFeatureService};
use portfolio_utils::portfolio_version;
use pretty_assertions::assert_eq;

use super::*;

#[tokio::test]
async fn liveness() {
    // Act
    let response = Sut::default().send(get("/health")).await;

    // Assert
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["message"], "Portfolio server is running");
    assert_eq!(response.body["version"], portfolio_version());
    assert!(response.body["timestamp"].is_string());
}

#[tokio::test]
async fn contact_health_connected() {
    // Arrange
    let sut = Sut {
        health: MockHealthFeatureService::new().with_get_status(HealthStatus { email: true }),
        ..Default::default()
    };

    // Act
    let response = sut.send(get("/api/contact/health")).await;

    // Assert
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["gmailConnection"], "connected");
}

#[tokio::test]
async fn contact_health_disconnected() {
    // Arrange
    let sut = Sut {
        health: MockHealthFeatureService::new().with_get_status(HealthStatus { email: false }),
        ..Default::default()
    };

    // Act
    let response = sut.send(get("/api/contact/health")).await;

    // Assert
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["gmailConnection"], "disconnected");
}
