//! Catalog client.
//!
//! Talks to the product catalog REST API: keeps the signed-in session,
//! attaches credentials and refreshes them on 401, and mirrors the
//! product list into a [`StateStore`] where views can observe it.
//!
//! # Usage
//!
//! ```ignore
//! use catalog_client::{CatalogClient, ClientConfig};
//!
//! let state = Arc::new(StateStore::new());
//! let client = CatalogClient::connect(ClientConfig::default(), kv, state).await?;
//! client.auth.login("alice", "secret").await?;
//! let products = client.products.list().await?;
//! ```

pub mod auth;
pub mod authorizer;
pub mod config;
pub mod error;
pub mod model;
pub mod product;
pub mod session;
pub mod token;

use std::sync::Arc;

use catalog_flux::StateStore;
use catalog_kv::KVStore;

pub use auth::AuthGateway;
pub use authorizer::{Authorizer, TokenRefresher};
pub use config::ClientConfig;
pub use error::{ApiError, FieldMessages};
pub use model::{
    LoginResponse, NewProduct, Price, PriceError, Product, ProductPatch, RegisterRequest, User,
};
pub use product::ProductRepository;
pub use session::SessionStore;

/// Session, auth gateway, authorizer and product repository wired together.
pub struct CatalogClient {
    pub config: ClientConfig,
    /// Store the session and product mirror publish into.
    pub state: Arc<StateStore>,
    pub session: Arc<SessionStore>,
    pub auth: Arc<AuthGateway>,
    pub api: Arc<Authorizer>,
    pub products: Arc<ProductRepository>,
}

impl CatalogClient {
    /// Wire the components without touching the network.
    ///
    /// Session keys live under the config's origin inside `kv`.
    pub fn new(
        config: ClientConfig,
        kv: Arc<dyn KVStore>,
        state: Arc<StateStore>,
    ) -> Result<Self, ApiError> {
        let (session, auth, api) = wire(&config, kv, &state)?;
        let products = Arc::new(ProductRepository::new(api.clone(), state.clone()));
        Ok(Self {
            config,
            state,
            session,
            auth,
            api,
            products,
        })
    }

    /// Like [`CatalogClient::new`], but opens the repository with an
    /// initial product load.
    pub async fn connect(
        config: ClientConfig,
        kv: Arc<dyn KVStore>,
        state: Arc<StateStore>,
    ) -> Result<Self, ApiError> {
        let (session, auth, api) = wire(&config, kv, &state)?;
        let products = Arc::new(ProductRepository::open(api.clone(), state.clone()).await);
        Ok(Self {
            config,
            state,
            session,
            auth,
            api,
            products,
        })
    }
}

type Wiring = (Arc<SessionStore>, Arc<AuthGateway>, Arc<Authorizer>);

fn wire(
    config: &ClientConfig,
    kv: Arc<dyn KVStore>,
    state: &Arc<StateStore>,
) -> Result<Wiring, ApiError> {
    let http = config.http_client()?;
    let session = Arc::new(SessionStore::for_origin(kv, config.origin(), state.clone()));
    let auth = Arc::new(AuthGateway::new(http.clone(), config.clone(), session.clone()));
    let api = Arc::new(Authorizer::new(
        http,
        config.clone(),
        session.clone(),
        auth.clone(),
    ));
    Ok((session, auth, api))
}
