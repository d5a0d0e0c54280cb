//! Intent handlers and their wiring into Flux.
//!
//! Every request type is registered at its `PATH`; the payload is
//! downcast to that type and handed to the matching `handle_*` function
//! together with the state store and the shared [`CatalogContext`].

pub mod app_handlers;
pub mod auth_handlers;
pub mod helpers;
pub mod product_handlers;

use std::sync::{Arc, Weak};

use catalog_client::product::ITEMS_PATH;
use catalog_client::session::AUTHENTICATED_PATH;
use catalog_client::{CatalogClient, Product};
use catalog_flux::{Flux, StateStore};
use tracing::{info, warn};

use crate::request::*;
use crate::state::*;

/// What handlers reach through `&self` in spirit: the wired client.
pub struct CatalogContext {
    pub client: CatalogClient,
}

impl CatalogContext {
    pub fn new(client: CatalogClient) -> Self {
        Self { client }
    }
}

/// Flux over the client's own state store, with every handler registered.
pub fn build(ctx: Arc<CatalogContext>) -> Flux {
    let flux = Flux::with_store(ctx.client.state.clone());
    register_handlers(&flux, ctx);
    flux
}

macro_rules! route {
    ($flux:expr, $ctx:expr, $req:ty, $handler:path) => {{
        let ctx = $ctx.clone();
        $flux.on(<$req>::PATH, move |path, payload, store: Arc<StateStore>| {
            let ctx = ctx.clone();
            async move {
                match payload.downcast_ref::<$req>() {
                    Some(req) => $handler(req, &store, &ctx).await,
                    None => warn!(%path, "intent payload has the wrong type"),
                }
            }
        });
    }};
}

/// Register all intent handlers and the session / mirror watchers.
///
/// `flux` must sit on the same store the client publishes into; see
/// [`build`].
pub fn register_handlers(flux: &Flux, ctx: Arc<CatalogContext>) {
    if !Arc::ptr_eq(flux.store(), &ctx.client.state) {
        warn!("flux and client use different state stores; session changes will not reach views");
    }

    // app
    route!(flux, ctx, InitializeReq, app_handlers::handle_initialize);
    route!(flux, ctx, NavigateReq, app_handlers::handle_navigate);
    route!(flux, ctx, DismissReq, app_handlers::handle_dismiss);

    // auth
    route!(flux, ctx, LoginReq, auth_handlers::handle_login);
    route!(flux, ctx, LogoutReq, auth_handlers::handle_logout);
    route!(flux, ctx, RegisterReq, auth_handlers::handle_register);

    // product list
    route!(flux, ctx, LoadProductsReq, product_handlers::handle_load);
    route!(flux, ctx, LoadAvailableReq, product_handlers::handle_load_available);

    // product dialogs
    route!(flux, ctx, NewProductReq, product_handlers::handle_new);
    route!(flux, ctx, EditProductReq, product_handlers::handle_edit);
    route!(flux, ctx, SaveProductReq, product_handlers::handle_save);
    route!(flux, ctx, CancelProductReq, product_handlers::handle_cancel);
    route!(flux, ctx, ViewProductReq, product_handlers::handle_view);
    route!(flux, ctx, CloseDetailReq, product_handlers::handle_close);
    route!(flux, ctx, AskDeleteReq, product_handlers::handle_ask_delete);
    route!(flux, ctx, ConfirmDeleteReq, product_handlers::handle_confirm_delete);
    route!(flux, ctx, CancelDeleteReq, product_handlers::handle_cancel_delete);

    watch_mirror(flux);
    watch_session(flux);
}

/// Keep the product table in step with the repository's mirror.
fn watch_mirror(flux: &Flux) {
    let weak: Weak<StateStore> = Arc::downgrade(flux.store());
    flux.subscribe(ITEMS_PATH, move |_, value| {
        let (Some(store), Some(mirror)) = (weak.upgrade(), value.downcast_ref::<Vec<Product>>())
        else {
            return;
        };
        let mut view = store
            .get_cloned::<ProductListView>(ProductListView::PATH)
            .unwrap_or_default();
        view.items = view.rows_from(mirror);
        store.set(ProductListView::PATH, view);
    });
}

/// Send the user to login when the session ends underneath them.
fn watch_session(flux: &Flux) {
    let weak: Weak<StateStore> = Arc::downgrade(flux.store());
    flux.subscribe(AUTHENTICATED_PATH, move |_, value| {
        if value.downcast_ref::<bool>() != Some(&false) {
            return;
        }
        let Some(store) = weak.upgrade() else {
            return;
        };
        let signed_in = store
            .get_cloned::<AuthState>(AuthState::PATH)
            .is_some_and(|a| a.is_authenticated());
        if !signed_in {
            return;
        }
        info!("session ended, returning to login");
        helpers::reset_views(&store);
        store.set(AuthState::PATH, AuthState::anonymous());
        helpers::set_route(&store, &crate::Route::Login { return_url: None });
    });
}
