#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use daybook_core::api::ApiClient;
use daybook_core::auth::{ManualClock, TokenStore};
use daybook_core::storage::MemoryStore;
use wiremock::MockServer;

/// A client wired to a mock server, in-memory storage, a manual clock and a
/// navigator that counts resets.
pub struct Harness {
    pub server: MockServer,
    pub storage: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub resets: Arc<AtomicUsize>,
    pub client: ApiClient,
}

impl Harness {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = format!("{}/api", server.uri());
        Self::with_base_url(server, &base_url)
    }

    /// A harness whose client points somewhere nothing listens.
    pub async fn unreachable() -> Self {
        let server = MockServer::start().await;
        Self::with_base_url(server, "http://127.0.0.1:1/api")
    }

    fn with_base_url(server: MockServer, base_url: &str) -> Self {
        let storage = Arc::new(MemoryStore::new());
        let start = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let resets = Arc::new(AtomicUsize::new(0));
        let counter = resets.clone();
        let navigator = move || {
            counter.fetch_add(1, Ordering::SeqCst);
        };
        let tokens = Arc::new(
            TokenStore::new(storage.clone(), Arc::new(navigator)).with_clock(clock.clone()),
        );
        let client = ApiClient::new(base_url, tokens).unwrap();
        Self {
            server,
            storage,
            clock,
            resets,
            client,
        }
    }

    pub fn login_as(&self, token: &str) {
        self.client.tokens().set_token(token).unwrap();
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|r| r.len())
            .unwrap_or(0)
    }
}
