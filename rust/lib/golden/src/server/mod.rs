//! Reference catalog backend.
//!
//! Serves the REST contract the client speaks (`/auth/*`, `/products/*`)
//! from a [`KVStore`], with JWT access and refresh tokens. Used by the
//! golden tests and by `catalogd` for local development.

pub mod handlers;
pub mod jwt;
pub mod validate;

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use catalog_client::{Price, Product, User};
use catalog_kv::{KVError, KVStore, MemoryStore};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

pub use jwt::{JwtService, TokenKind};

const PRODUCT_PREFIX: &str = "product:";
const USER_PREFIX: &str = "user:";

fn product_key(id: i64) -> String {
    format!("{}{:010}", PRODUCT_PREFIX, id)
}

fn user_key(username: &str) -> String {
    format!("{}{}", USER_PREFIX, username)
}

// ── Errors ─────────────────────────────────────────────────────────

/// Failure of a backend call, rendered as the JSON body the client parses.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// 400 with a ready-made body (`{error}`, `{details}` or `{field: [..]}`).
    #[error("bad request")]
    BadRequest(Value),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("not found")]
    NotFound,
    #[error("internal: {0}")]
    Internal(String),
}

impl From<KVError> for ServerError {
    fn from(e: KVError) -> Self {
        ServerError::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(e: serde_json::Error) -> Self {
        ServerError::Internal(e.to_string())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ServerError::BadRequest(body) => (StatusCode::BAD_REQUEST, body),
            ServerError::Unauthorized(detail) => (StatusCode::UNAUTHORIZED, json!({ "detail": detail })),
            ServerError::NotFound => (StatusCode::NOT_FOUND, json!({ "detail": "Not found." })),
            ServerError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

// ── Hit counters ───────────────────────────────────────────────────

/// Requests received per endpoint group, whatever their outcome.
#[derive(Debug, Default)]
pub struct Hits {
    pub login: AtomicUsize,
    pub register: AtomicUsize,
    pub logout: AtomicUsize,
    pub refresh: AtomicUsize,
    pub products: AtomicUsize,
}

impl Hits {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        [
            &self.login,
            &self.register,
            &self.logout,
            &self.refresh,
            &self.products,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }

    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Backend ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredUser {
    user: User,
    password: String,
}

pub struct Backend {
    kv: Arc<dyn KVStore>,
    jwt: JwtService,
    next_product_id: AtomicI64,
    next_user_id: AtomicI64,
    hits: Hits,
}

impl Backend {
    pub fn new(kv: Arc<dyn KVStore>, jwt: JwtService) -> Self {
        Self {
            kv,
            jwt,
            next_product_id: AtomicI64::new(1),
            next_user_id: AtomicI64::new(1),
            hits: Hits::default(),
        }
    }

    pub fn in_memory(jwt: JwtService) -> Self {
        Self::new(Arc::new(MemoryStore::new()), jwt)
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    pub fn hits(&self) -> &Hits {
        &self.hits
    }

    /// The id the next created product gets.
    pub fn set_next_product_id(&self, id: i64) {
        self.next_product_id.store(id, Ordering::SeqCst);
    }

    // ── Users ──

    pub fn add_user(
        &self,
        username: &str,
        password: &str,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<User, ServerError> {
        let user = User {
            id: self.next_user_id.fetch_add(1, Ordering::SeqCst),
            username: username.to_string(),
            email: email.to_string(),
            first_name: Some(first_name.to_string()).filter(|s| !s.is_empty()),
            last_name: Some(last_name.to_string()).filter(|s| !s.is_empty()),
        };
        let stored = StoredUser {
            user: user.clone(),
            password: password.to_string(),
        };
        self.kv
            .set(&user_key(username), &serde_json::to_vec(&stored)?)?;
        Ok(user)
    }

    pub fn user_exists(&self, username: &str) -> Result<bool, ServerError> {
        Ok(self.kv.get(&user_key(username))?.is_some())
    }

    /// The user when `password` matches.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>, ServerError> {
        let Some(raw) = self.kv.get(&user_key(username))? else {
            return Ok(None);
        };
        let stored: StoredUser = serde_json::from_slice(&raw)?;
        Ok((stored.password == password).then_some(stored.user))
    }

    pub fn find_user(&self, username: &str) -> Result<Option<User>, ServerError> {
        let Some(raw) = self.kv.get(&user_key(username))? else {
            return Ok(None);
        };
        let stored: StoredUser = serde_json::from_slice(&raw)?;
        Ok(Some(stored.user))
    }

    // ── Products ──

    /// All products, newest first.
    pub fn products(&self) -> Result<Vec<Product>, ServerError> {
        let mut items = self
            .kv
            .scan(PRODUCT_PREFIX)?
            .into_iter()
            .map(|(_, raw)| serde_json::from_slice::<Product>(&raw))
            .collect::<Result<Vec<_>, _>>()?;
        items.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(items)
    }

    pub fn product(&self, id: i64) -> Result<Product, ServerError> {
        let raw = self.kv.get(&product_key(id))?.ok_or(ServerError::NotFound)?;
        Ok(serde_json::from_slice(&raw)?)
    }

    pub fn insert_product(&self, name: &str, price: Price, available: bool) -> Result<Product, ServerError> {
        let now = chrono::Utc::now();
        let product = Product {
            id: self.next_product_id.fetch_add(1, Ordering::SeqCst),
            name: name.to_string(),
            price,
            available,
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.put_product(&product)?;
        Ok(product)
    }

    pub fn put_product(&self, product: &Product) -> Result<(), ServerError> {
        self.kv
            .set(&product_key(product.id), &serde_json::to_vec(product)?)?;
        Ok(())
    }

    pub fn remove_product(&self, id: i64) -> Result<(), ServerError> {
        let key = product_key(id);
        if self.kv.get(&key)?.is_none() {
            return Err(ServerError::NotFound);
        }
        self.kv.delete(&key)?;
        Ok(())
    }

    /// The five demo products.
    pub fn seed_samples(&self) -> Result<(), ServerError> {
        let samples = [
            ("Smartphone Samsung Galaxy", 89999, true),
            ("Notebook Dell Inspiron", 129990, true),
            ("Fone Bluetooth JBL", 14950, false),
            ("Mouse Logitech MX", 8990, true),
            ("Teclado Mecânico Razer", 19999, true),
        ];
        for (name, cents, available) in samples {
            self.insert_product(name, Price::from_cents(cents), available)?;
        }
        info!("seeded {} sample products", samples.len());
        Ok(())
    }
}

/// The HTTP API, mounted under `/api`.
pub fn router(backend: Arc<Backend>) -> Router {
    let api = Router::new()
        .route("/auth/login/", post(handlers::login))
        .route("/auth/register/", post(handlers::register))
        .route("/auth/logout/", post(handlers::logout))
        .route("/auth/refresh/", post(handlers::refresh))
        .route(
            "/products/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route("/products/available/", get(handlers::list_available))
        .route(
            "/products/{id}/",
            get(handlers::get_product)
                .put(handlers::replace_product)
                .patch(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }));

    Router::new().nest("/api", api).with_state(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> Backend {
        Backend::in_memory(JwtService::new("k", 60, 600))
    }

    #[test]
    fn products_are_newest_first() {
        let b = backend();
        b.seed_samples().unwrap();
        b.set_next_product_id(42);
        b.insert_product("Widget", Price::from_cents(999), true).unwrap();

        let items = b.products().unwrap();
        assert_eq!(items.len(), 6);
        assert_eq!(items[0].id, 42);
        assert_eq!(items[5].name, "Smartphone Samsung Galaxy");
    }

    #[test]
    fn remove_missing_product() {
        let b = backend();
        assert!(matches!(b.remove_product(9), Err(ServerError::NotFound)));
    }

    #[test]
    fn authenticate_checks_password() {
        let b = backend();
        b.add_user("alice", "secret", "alice@example.com", "Alice", "").unwrap();
        assert_eq!(
            b.authenticate("alice", "secret").unwrap().map(|u| u.username),
            Some("alice".to_string())
        );
        assert!(b.authenticate("alice", "nope").unwrap().is_none());
        assert!(b.authenticate("bob", "secret").unwrap().is_none());
        assert!(b.find_user("alice").unwrap().unwrap().last_name.is_none());
    }
}
