use std::sync::Arc;

use catalog_flux::StateStore;
use parking_lot::RwLock;
use reqwest::Method;
use tracing::{debug, info, warn};

use crate::authorizer::Authorizer;
use crate::error::ApiError;
use crate::model::{NewProduct, Product, ProductPatch};

/// `Vec<Product>`: the mirrored list, in server order.
pub const ITEMS_PATH: &str = "products/items";

const COLLECTION: &str = "products/";
const AVAILABLE: &str = "products/available/";

fn item_path(id: i64) -> String {
    format!("products/{}/", id)
}

/// Product CRUD plus the in-memory mirror of the server's list.
///
/// The mirror only changes after a successful server response and is
/// republished at [`ITEMS_PATH`] after every change.
pub struct ProductRepository {
    api: Arc<Authorizer>,
    state: Arc<StateStore>,
    items: RwLock<Vec<Product>>,
}

impl ProductRepository {
    /// Empty repository; publishes the empty list.
    pub fn new(api: Arc<Authorizer>, state: Arc<StateStore>) -> Self {
        state.set(ITEMS_PATH, Vec::<Product>::new());
        Self {
            api,
            state,
            items: RwLock::new(Vec::new()),
        }
    }

    /// Create the repository and try an initial load.
    ///
    /// A failed load is logged and leaves the mirror empty.
    pub async fn open(api: Arc<Authorizer>, state: Arc<StateStore>) -> Self {
        let repo = Self::new(api, state);
        if let Err(e) = repo.list().await {
            warn!("initial product load failed: {} ({})", e, e.detail().unwrap_or(""));
        }
        repo
    }

    /// Fetch the whole list and replace the mirror with it.
    pub async fn list(&self) -> Result<Vec<Product>, ApiError> {
        let items: Vec<Product> = self.api.get(COLLECTION).await?;
        debug!(count = items.len(), "products loaded");
        self.publish(|mirror| *mirror = items.clone());
        Ok(items)
    }

    /// Products flagged available. The mirror is left as is.
    pub async fn list_available(&self) -> Result<Vec<Product>, ApiError> {
        self.api.get(AVAILABLE).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Product, ApiError> {
        self.api.get(&item_path(id)).await
    }

    /// Look `id` up in the mirror without a network call.
    pub fn cached(&self, id: i64) -> Option<Product> {
        self.items.read().iter().find(|p| p.id == id).cloned()
    }

    pub fn snapshot(&self) -> Vec<Product> {
        self.items.read().clone()
    }

    pub async fn create(&self, product: &NewProduct) -> Result<Product, ApiError> {
        let created: Product = self
            .api
            .send_json(Method::POST, COLLECTION, product)
            .await?;
        info!(id = created.id, name = %created.name, "product created");
        let record = created.clone();
        self.publish(move |mirror| match mirror.iter_mut().find(|p| p.id == record.id) {
            Some(slot) => *slot = record,
            None => mirror.push(record),
        });
        Ok(created)
    }

    /// Partial update (PATCH).
    pub async fn update(&self, id: i64, patch: &ProductPatch) -> Result<Product, ApiError> {
        let updated: Product = self
            .api
            .send_json(Method::PATCH, &item_path(id), patch)
            .await?;
        self.replace_in_mirror(id, updated.clone());
        Ok(updated)
    }

    /// Full update (PUT).
    pub async fn replace(&self, id: i64, product: &NewProduct) -> Result<Product, ApiError> {
        let updated: Product = self
            .api
            .send_json(Method::PUT, &item_path(id), product)
            .await?;
        self.replace_in_mirror(id, updated.clone());
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.api.delete(&item_path(id)).await?;
        info!(id, "product deleted");
        self.publish(|mirror| mirror.retain(|p| p.id != id));
        Ok(())
    }

    fn replace_in_mirror(&self, id: i64, updated: Product) {
        debug!(id, "product updated");
        self.publish(move |mirror| {
            if let Some(slot) = mirror.iter_mut().find(|p| p.id == id) {
                *slot = updated;
            }
        });
    }

    /// Mutate under the lock, publish after releasing it.
    fn publish<F: FnOnce(&mut Vec<Product>)>(&self, f: F) {
        let snapshot = {
            let mut items = self.items.write();
            f(&mut items);
            items.clone()
        };
        self.state.set(ITEMS_PATH, snapshot);
    }
}
