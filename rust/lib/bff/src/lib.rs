//! Catalog view layer.
//!
//! Screens are plain state at fixed paths (`products/view`,
//! `product/form`, ...) and user actions are intents emitted through a
//! [`Flux`](catalog_flux::Flux). Handlers validate forms locally, call the
//! catalog client, and write the resulting view state back.
//!
//! ```ignore
//! let ctx = Arc::new(CatalogContext::new(client));
//! let flux = catalog_bff::build(ctx);
//! flux.emit(InitializeReq::PATH, InitializeReq::default()).await;
//! flux.emit(LoginReq::PATH, LoginReq::new("alice", "secret")).await;
//! ```

pub mod form;
pub mod handlers;
pub mod request;
pub mod route;
pub mod state;

pub use handlers::{build, register_handlers, CatalogContext};
pub use route::Route;
