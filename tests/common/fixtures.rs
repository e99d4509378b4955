//! Test fixtures
//!
//! Every fixture runs on the in-memory store with a strict directory that
//! knows customers 1 and 2 and provider 7.

use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use marketchat::backend::auth::sessions::{encode_claims, Claims, DEFAULT_TOKEN_TTL};
use marketchat::backend::auth::{create_token, InMemoryDirectory};
use marketchat::backend::chat::store::{InMemoryStore, MessageStore, StoreError, ThreadRow};
use marketchat::backend::routes::create_router;
use marketchat::backend::{AppState, ServerConfig};
use marketchat::shared::{ConversationKey, Message, Participant, ParticipantProfile};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const BRIDGE_KEY: &str = "bridge-test-key";

pub const ALICE: Participant = Participant::Customer(1);
pub const BOB: Participant = Participant::Customer(2);
pub const ACME: Participant = Participant::Provider(7);

pub fn test_config() -> ServerConfig {
    ServerConfig::builder()
        .jwt_secret(TEST_SECRET)
        .bridge_key(BRIDGE_KEY)
        .build()
        .expect("test configuration is valid")
}

pub fn test_directory() -> Arc<InMemoryDirectory> {
    Arc::new(InMemoryDirectory::with_profiles([
        ParticipantProfile::new(ALICE).with_display_name("Alice"),
        ParticipantProfile::new(BOB).with_display_name("Bob"),
        ParticipantProfile::new(ACME).with_display_name("Acme Plumbing"),
    ]))
}

/// State over a fresh in-memory store; the store is returned so tests can
/// inspect the log directly
pub fn test_state() -> (AppState, Arc<InMemoryStore>) {
    test_state_with(test_config())
}

pub fn test_state_with(config: ServerConfig) -> (AppState, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let state = AppState::new(config, store.clone(), test_directory());
    (state, store)
}

/// State whose store refuses every operation
pub fn failing_state() -> AppState {
    AppState::new(test_config(), Arc::new(FailingStore), test_directory())
}

pub fn token_for(participant: Participant) -> String {
    create_token(participant, DEFAULT_TOKEN_TTL, TEST_SECRET).expect("token encodes")
}

pub fn expired_token_for(participant: Participant) -> String {
    let mut claims = Claims::for_participant(participant, Duration::ZERO);
    claims.iat -= 7200;
    claims.exp -= 3600;
    encode_claims(&claims, TEST_SECRET).expect("token encodes")
}

/// Serve the router on an ephemeral local port
pub async fn spawn_server(state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local address");
    let app = create_router(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });

    addr
}

/// Poll `condition` until it holds or a second has passed
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..50 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    condition()
}

pub struct FailingStore;

#[async_trait]
impl MessageStore for FailingStore {
    async fn append(
        &self,
        _key: ConversationKey,
        _sender: Participant,
        _receiver: Participant,
        _body: &str,
    ) -> Result<Message, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    async fn history(&self, _key: ConversationKey) -> Result<Vec<Message>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    async fn mark_read(&self, _key: ConversationKey, _reader: Participant) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    async fn threads(&self, _participant: Participant) -> Result<Vec<ThreadRow>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }
}
