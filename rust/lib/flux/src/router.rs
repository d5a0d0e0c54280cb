use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use crate::store::StateStore;
use crate::trie::Trie;

pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Payload handed to intent handlers; downcast inside the handler.
pub type Payload = Arc<dyn Any + Send + Sync>;

type Handler = Arc<dyn Fn(String, Payload, Arc<StateStore>) -> BoxFuture + Send + Sync>;

/// Routes intents (`auth/login`, `product/save`, ...) to async handlers.
///
/// Every handler whose pattern matches runs, one after another, in the
/// order the trie yields them. An intent nobody handles is dropped.
pub struct Router {
    trie: Trie<Handler>,
}

impl Router {
    pub fn new() -> Self {
        Self { trie: Trie::new() }
    }

    pub fn on<F, Fut>(&self, pattern: &str, handler: F)
    where
        F: Fn(String, Payload, Arc<StateStore>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |path, payload, store| -> BoxFuture {
            Box::pin(handler(path, payload, store))
        });
        self.trie.insert(pattern, handler);
    }

    pub async fn dispatch(&self, path: &str, payload: Payload, store: Arc<StateStore>) {
        let handlers = self.trie.match_topic(path);
        if handlers.is_empty() {
            debug!(path, "no handler for intent");
            return;
        }
        for handler in handlers {
            handler(path.to_string(), Arc::clone(&payload), Arc::clone(&store)).await;
        }
    }

    /// Whether dispatching `path` would reach any handler.
    pub fn has_handler(&self, path: &str) -> bool {
        !self.trie.match_topic(path).is_empty()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
