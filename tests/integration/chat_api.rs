//! REST chat endpoints: threads, history and read state

use axum::http::StatusCode;
use axum_test::TestServer;
use pretty_assertions::assert_eq;

use marketchat::backend::chat::store::MessageStore;
use marketchat::backend::routes::create_router;
use marketchat::shared::{ConversationKey, ConversationSummary, Message};

use crate::common::*;
use crate::{assert_contains, assert_unread};

fn server(state: marketchat::backend::AppState) -> TestServer {
    TestServer::new(create_router(state)).expect("test server")
}

async fn threads_of(server: &TestServer, token: &str) -> Vec<ConversationSummary> {
    let response = server.get("/api/chat/threads").authorization_bearer(token).await;
    response.assert_status_ok();
    response.json::<Vec<ConversationSummary>>()
}

#[tokio::test]
async fn test_health_check() {
    let (state, _) = test_state();
    let response = server(state).get("/health").await;

    response.assert_status_ok();
    response.assert_text("ok");
}

#[tokio::test]
async fn test_threads_require_token() {
    let (state, _) = test_state();
    let server = server(state);

    server.get("/api/chat/threads").await.assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/api/chat/threads")
        .authorization_bearer("not-a-jwt")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/api/chat/threads")
        .authorization_bearer(expired_token_for(ALICE))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_participant_token_is_refused() {
    let (state, _) = test_state();
    let stranger = marketchat::shared::Participant::Customer(404);

    server(state)
        .get("/api/chat/threads")
        .authorization_bearer(token_for(stranger))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_first_message_then_read() {
    let (state, store) = test_state();
    store.append(ConversationKey::new(1, 7), ALICE, ACME, "Hello").await.unwrap();

    let server = server(state);
    let acme = token_for(ACME);

    let history = server
        .get("/api/chat/history/1")
        .authorization_bearer(&acme)
        .await
        .json::<Vec<Message>>();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].sender, ALICE);
    assert!(!history[0].is_read);
    assert_unread!(threads_of(&server, &acme).await, [(1, 1)]);

    server
        .post("/api/chat/mark-read/1")
        .authorization_bearer(&acme)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert_unread!(threads_of(&server, &acme).await, [(1, 0)]);
    let history = server
        .get("/api/chat/history/1")
        .authorization_bearer(&acme)
        .await
        .json::<Vec<Message>>();
    assert_eq!(history.len(), 1);
    assert!(history[0].is_read);
}

#[tokio::test]
async fn test_thread_summary_and_mark_read() {
    let (state, store) = test_state();
    let key = ConversationKey::new(1, 7);
    store.append(key, ALICE, ACME, "Hi").await.unwrap();
    store.append(key, ACME, ALICE, "Hello").await.unwrap();
    store.append(key, ALICE, ACME, "Are you free?").await.unwrap();

    let server = server(state);
    let alice = token_for(ALICE);
    let acme = token_for(ACME);

    let alice_view = threads_of(&server, &alice).await;
    assert_eq!(alice_view.len(), 1);
    assert_eq!(alice_view[0].counterpart, ACME);
    assert_eq!(alice_view[0].counterpart_name.as_deref(), Some("Acme Plumbing"));
    assert_eq!(alice_view[0].last_message.body, "Are you free?");
    assert_unread!(alice_view, [(7, 1)]);

    let acme_view = threads_of(&server, &acme).await;
    assert_eq!(acme_view[0].counterpart, ALICE);
    assert_unread!(acme_view, [(1, 2)]);

    server
        .post("/api/chat/mark-read/1")
        .authorization_bearer(&acme)
        .await
        .assert_status(StatusCode::NO_CONTENT);

    assert_unread!(threads_of(&server, &acme).await, [(1, 0)]);
    // the other side's unread state is untouched
    assert_unread!(threads_of(&server, &alice).await, [(7, 1)]);

    server
        .post("/api/chat/mark-read/1")
        .authorization_bearer(&acme)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert_unread!(threads_of(&server, &acme).await, [(1, 0)]);
}

#[tokio::test]
async fn test_provider_sees_threads_newest_first() {
    let (state, store) = test_state();
    store.append(ConversationKey::new(1, 7), ALICE, ACME, "first").await.unwrap();
    store.append(ConversationKey::new(2, 7), BOB, ACME, "second").await.unwrap();

    let server = server(state);
    let view = threads_of(&server, &token_for(ACME)).await;

    let order: Vec<_> = view.iter().map(|s| s.counterpart).collect();
    assert_eq!(order, vec![BOB, ALICE]);
    assert_unread!(view, [(1, 1), (2, 1)]);

    // customers only ever see their own conversation
    let alice_view = threads_of(&server, &token_for(ALICE)).await;
    assert_eq!(alice_view.len(), 1);
    assert_eq!(alice_view[0].last_message.body, "first");
}

#[tokio::test]
async fn test_empty_thread_list() {
    let (state, _) = test_state();
    let view = threads_of(&server(state), &token_for(BOB)).await;
    assert!(view.is_empty());
}

#[tokio::test]
async fn test_history_is_symmetric_and_ordered() {
    let (state, store) = test_state();
    let key = ConversationKey::new(1, 7);
    store.append(key, ALICE, ACME, "one").await.unwrap();
    store.append(key, ACME, ALICE, "two").await.unwrap();
    store.append(ConversationKey::new(2, 7), BOB, ACME, "elsewhere").await.unwrap();
    store.append(key, ALICE, ACME, "three").await.unwrap();

    let server = server(state);

    let from_alice = server
        .get("/api/chat/history/7")
        .authorization_bearer(token_for(ALICE))
        .await
        .json::<Vec<Message>>();
    let from_acme = server
        .get("/api/chat/history/1")
        .authorization_bearer(token_for(ACME))
        .await
        .json::<Vec<Message>>();

    let bodies: Vec<_> = from_alice.iter().map(|m| m.body.as_str()).collect();
    assert_eq!(bodies, vec!["one", "two", "three"]);
    assert!(from_alice.windows(2).all(|w| w[0].id < w[1].id));
    assert_eq!(from_alice, from_acme);
}

#[tokio::test]
async fn test_history_of_unknown_counterpart_is_not_found() {
    let (state, _) = test_state();
    let server = server(state);

    let response = server
        .get("/api/chat/history/99")
        .authorization_bearer(token_for(ALICE))
        .await;
    response.assert_status_not_found();

    server
        .post("/api/chat/mark-read/99")
        .authorization_bearer(token_for(ALICE))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_store_outage_is_hidden_from_clients() {
    let server = server(failing_state());

    let response = server
        .get("/api/chat/threads")
        .authorization_bearer(token_for(ALICE))
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let body = response.json::<serde_json::Value>();
    assert_eq!(body["status"], 503);
    let message = body["error"].as_str().unwrap_or_default().to_string();
    assert_contains!(message, "unavailable");
    assert!(!message.contains("store offline"));

    server
        .get("/api/chat/history/7")
        .authorization_bearer(token_for(ALICE))
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_unknown_route_falls_back_to_not_found() {
    let (state, _) = test_state();
    server(state).get("/api/nope").await.assert_status_not_found();
}
