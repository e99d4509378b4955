//! Notification bridge: publish endpoint, SSE stream and HTTP client

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::json;
use std::time::Duration;

use marketchat::backend::notify::NotificationClient;
use marketchat::backend::routes::create_router;
use marketchat::shared::{NotificationEvent, PublishResponse};

use crate::assert_contains;
use crate::common::*;

fn bridge_key_header() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-bridge-key"),
        HeaderValue::from_static(BRIDGE_KEY),
    )
}

#[tokio::test]
async fn test_publish_requires_bridge_key() {
    let (state, _) = test_state();
    let server = TestServer::new(create_router(state)).expect("test server");

    let body = json!({"participant": {"type": "provider", "id": 7}, "message": "Booking accepted"});

    server
        .post("/notifications")
        .json(&body)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .post("/notifications")
        .add_header(HeaderName::from_static("x-bridge-key"), HeaderValue::from_static("wrong"))
        .json(&body)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_publish_without_consumers_is_accepted() {
    let (state, _) = test_state();
    let server = TestServer::new(create_router(state)).expect("test server");
    let (name, value) = bridge_key_header();

    let response = server
        .post("/notifications")
        .add_header(name, value)
        .json(&json!({"participant": {"type": "customer", "id": 1}, "message": "Payment received"}))
        .await;

    response.assert_status(StatusCode::ACCEPTED);
    assert_eq!(response.json::<PublishResponse>(), PublishResponse { delivered: 0 });
}

#[tokio::test]
async fn test_publish_reaches_only_the_addressed_participant() {
    let (state, _) = test_state();
    let mut acme = state.notifications.subscribe(ACME);
    let mut alice = state.notifications.subscribe(ALICE);
    // a customer with the provider's numeric id is a different participant
    let mut customer_seven = state.notifications.subscribe(marketchat::shared::Participant::Customer(7));

    let server = TestServer::new(create_router(state)).expect("test server");
    let (name, value) = bridge_key_header();

    let response = server
        .post("/notifications")
        .add_header(name, value)
        .json(&json!({"participant": {"type": "provider", "id": 7}, "message": "Booking accepted"}))
        .await;
    response.assert_status(StatusCode::ACCEPTED);
    assert_eq!(response.json::<PublishResponse>().delivered, 1);

    assert_eq!(acme.recv().await.unwrap(), NotificationEvent::new("Booking accepted"));
    assert!(alice.try_recv().is_err());
    assert!(customer_seven.try_recv().is_err());
}

#[tokio::test]
async fn test_publish_rejects_blank_message() {
    let (state, _) = test_state();
    let server = TestServer::new(create_router(state)).expect("test server");
    let (name, value) = bridge_key_header();

    server
        .post("/notifications")
        .add_header(name, value)
        .json(&json!({"participant": {"type": "provider", "id": 7}, "message": "   "}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stream_requires_token() {
    let (state, _) = test_state();
    let server = TestServer::new(create_router(state)).expect("test server");

    server
        .get("/notifications/stream")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/notifications/stream")
        .add_query_param("token", expired_token_for(ACME))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_stream_delivers_published_event() {
    let (state, _) = test_state();
    let hub = state.notifications.clone();
    let addr = spawn_server(state).await;
    let base = format!("http://{}", addr);

    let mut stream = reqwest::Client::new()
        .get(format!("{}/notifications/stream?token={}", base, token_for(ACME)))
        .send()
        .await
        .expect("stream request");
    assert_eq!(stream.status(), reqwest::StatusCode::OK);
    assert!(eventually(|| hub.subscriber_count(ACME) == 1).await);

    let client = NotificationClient::new(&base).with_bridge_key(BRIDGE_KEY);
    let outcome = client.publish(ACME, "Booking accepted").await.expect("publish");
    assert_eq!(outcome.delivered, 1);

    let mut received = String::new();
    let read = tokio::time::timeout(Duration::from_secs(2), async {
        while !received.contains("Booking accepted") {
            match stream.chunk().await {
                Ok(Some(chunk)) => received.push_str(&String::from_utf8_lossy(&chunk)),
                _ => break,
            }
        }
    })
    .await;

    assert!(read.is_ok(), "timed out waiting for the event");
    assert_contains!(received, "event: notification");
    assert_contains!(received, r#"{"message":"Booking accepted"}"#);
}

#[tokio::test]
async fn test_client_without_key_reports_zero() {
    let (state, _) = test_state();
    let _consumer = state.notifications.subscribe(ALICE);
    let addr = spawn_server(state).await;

    let client = NotificationClient::new(format!("http://{}", addr));
    assert!(client.publish(ALICE, "Payment received").await.is_err());
    assert_eq!(client.notify(ALICE, "Payment received").await, 0);
}
