//! Test server and client setup shared by the golden tests.

use std::sync::Arc;

use catalog_client::{CatalogClient, ClientConfig};
use catalog_flux::StateStore;
use catalog_kv::{KVStore, MemoryStore};

use crate::server::{self, Backend, JwtService};

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "secret";

const SECRET: &str = "golden-test-jwt-secret";

pub struct TestServer {
    pub base_url: String,
    pub backend: Arc<Backend>,
}

/// Backend with alice and the five sample products.
pub fn seeded_backend(access_ttl: i64) -> Backend {
    let backend = Backend::in_memory(JwtService::new(SECRET, access_ttl, 3600));
    backend
        .add_user(USERNAME, PASSWORD, "alice@example.com", "Alice", "Liddell")
        .unwrap();
    backend.seed_samples().unwrap();
    backend
}

pub async fn start_server(backend: Backend) -> TestServer {
    let backend = Arc::new(backend);
    let app = server::router(backend.clone());

    // Bind to random port.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}/api", addr);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Wait for server to be ready.
    let ping = reqwest::Client::new();
    for _ in 0..50 {
        if ping.get(format!("{}/health", base_url)).send().await.is_ok() {
            break;
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
    }

    TestServer { base_url, backend }
}

pub async fn start_default() -> TestServer {
    start_server(seeded_backend(300)).await
}

/// Serve a hand-built router, for server behavior the backend never shows.
/// Returns the base URL with `/api` appended; routes are matched as given.
pub async fn start_stub(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

/// A base URL nothing listens on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api", addr)
}

pub fn client_for(base_url: &str, kv: Arc<dyn KVStore>) -> CatalogClient {
    CatalogClient::new(ClientConfig::new(base_url), kv, Arc::new(StateStore::new())).unwrap()
}

pub fn client(server: &TestServer) -> CatalogClient {
    client_for(&server.base_url, Arc::new(MemoryStore::new()))
}
