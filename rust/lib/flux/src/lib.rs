//! Flux: the reactive core of the catalog client.
//!
//! Every observable piece of the app (session, product cache, view state)
//! lives at a `/`-separated path in one [`StateStore`]. Views read with
//! `get`, user actions arrive as intents through `emit`, and anything that
//! needs to react to a change registers a `subscribe` callback.
//!
//! # Paths
//!
//! - Session: `session/authenticated`, `session/user`
//! - Cache: `products/items`
//! - Views: `auth/state`, `products/view`, `product/form`
//!
//! # Patterns
//!
//! Subscriptions and intent handlers share MQTT-style matching:
//! - `product/form` matches itself only
//! - `product/+` matches one level under `product/`
//! - `session/#` matches everything under `session/`
//! - `#` matches every path
//!
//! # Example
//!
//! ```ignore
//! use catalog_flux::Flux;
//!
//! let flux = Flux::new();
//!
//! flux.on("products/load", |_, _, store| async move {
//!     store.set("products/view", ProductListView::loading());
//! });
//!
//! flux.subscribe("products/#", |path, _| println!("{path} changed"));
//!
//! flux.emit("products/load", ()).await;
//! ```

pub mod app;
pub mod router;
pub mod store;
pub mod trie;
pub mod value;

pub use app::Flux;
pub use router::{BoxFuture, Payload, Router};
pub use store::{ChangeHandler, StateStore};
pub use trie::Trie;
pub use value::{StateValue, SubscriptionId};
