use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::trie::Trie;
use crate::value::{StateValue, SubscriptionId};

/// Callback invoked with `(path, new_value)` after a matching `set`.
pub type ChangeHandler = Arc<dyn Fn(&str, &StateValue) + Send + Sync>;

/// Path-keyed state with pattern subscriptions.
///
/// `set` stores the value, releases the lock, then calls every subscriber
/// whose pattern matches, synchronously and in registration order per
/// pattern. A subscriber registered after a `set` only sees later changes;
/// it reads the current value with `get` if it needs one.
pub struct StateStore {
    values: RwLock<HashMap<String, StateValue>>,
    handlers: Trie<Subscriber>,
    next_id: AtomicU64,
}

#[derive(Clone)]
struct Subscriber {
    id: SubscriptionId,
    handler: ChangeHandler,
}

impl StateStore {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            handlers: Trie::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Publish `value` at `path` and notify matching subscribers.
    pub fn set<T: Any + Send + Sync>(&self, path: &str, value: T) {
        let value = StateValue::new(value);
        self.values.write().insert(path.to_string(), value.clone());

        let subscribers = self.handlers.match_topic(path);
        trace!(path, subscribers = subscribers.len(), "state changed");
        for sub in subscribers {
            (sub.handler)(path, &value);
        }
    }

    pub fn get(&self, path: &str) -> Option<StateValue> {
        self.values.read().get(path).cloned()
    }

    /// Read `path` and clone it out as `T`.
    ///
    /// `None` if nothing is stored there or it holds another type.
    pub fn get_cloned<T: Any + Clone>(&self, path: &str) -> Option<T> {
        self.get(path).and_then(|v| v.cloned::<T>())
    }

    /// Register `handler` for every future `set` on a path matching `pattern`.
    pub fn subscribe<F>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &StateValue) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.insert(
            pattern,
            Subscriber {
                id,
                handler: Arc::new(handler),
            },
        );
        id
    }

    /// Stop notifications for `id`. Unknown ids are ignored.
    pub fn unsubscribe(&self, pattern: &str, id: SubscriptionId) {
        self.handlers.remove(pattern, |sub| sub.id == id);
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}
