use catalog_client::{ApiError, Product};
use catalog_flux::StateStore;
use tracing::debug;

use super::helpers::{report, set_route};
use super::{product_handlers, CatalogContext};
use crate::form::ProductForm;
use crate::request::{DismissReq, InitializeReq, NavigateReq};
use crate::route::Route;
use crate::state::*;

/// Seed every view from the stored session, then go to the first route.
pub async fn handle_initialize(req: &InitializeReq, store: &StateStore, ctx: &CatalogContext) {
    let session = &ctx.client.session;
    let auth = match session.current_user() {
        Some(user) if session.has_valid_token() => AuthState::signed_in(&user),
        _ => AuthState::anonymous(),
    };
    store.set(AuthState::PATH, auth);
    store.set(Notifications::PATH, Notifications::default());
    store.set(
        ProductListView::PATH,
        ProductListView {
            items: ctx.client.products.snapshot(),
            ..Default::default()
        },
    );
    store.set(ProductFormState::PATH, ProductFormState::closed());
    store.set(ProductDetailView::PATH, ProductDetailView::default());
    store.set(DeleteDialog::PATH, DeleteDialog::default());
    store.set(LoginFormState::PATH, LoginFormState::default());
    store.set(RegisterFormState::PATH, RegisterFormState::default());

    navigate(req.route.as_deref().unwrap_or("/"), store, ctx).await;
}

pub async fn handle_navigate(req: &NavigateReq, store: &StateStore, ctx: &CatalogContext) {
    navigate(&req.route, store, ctx).await;
}

pub async fn handle_dismiss(req: &DismissReq, store: &StateStore, _ctx: &CatalogContext) {
    let mut list = store
        .get_cloned::<Notifications>(Notifications::PATH)
        .unwrap_or_default();
    if list.dismiss(req.id) {
        store.set(Notifications::PATH, list);
    }
}

/// Guard `location`, publish the resulting route and prepare its screen.
///
/// Returns the route actually shown.
pub async fn navigate(location: &str, store: &StateStore, ctx: &CatalogContext) -> Route {
    let authenticated = ctx.client.session.has_valid_token();
    let route = Route::parse(location).guard(authenticated);
    debug!(%location, route = %route, "navigate");
    set_route(store, &route);

    match &route {
        Route::Products => {
            store.set(ProductFormState::PATH, ProductFormState::closed());
            store.set(ProductDetailView::PATH, ProductDetailView::default());
            product_handlers::load_all(store, ctx).await;
        }
        Route::ProductNew => {
            store.set(ProductFormState::PATH, ProductFormState::open(ProductForm::blank()));
        }
        Route::ProductEdit(id) => match resolve(*id, ctx).await {
            Ok(product) => store.set(
                ProductFormState::PATH,
                ProductFormState::open(ProductForm::from_product(&product)),
            ),
            Err(e) => not_found(store, &e),
        },
        Route::ProductDetail(id) => match resolve(*id, ctx).await {
            Ok(product) => store.set(
                ProductDetailView::PATH,
                ProductDetailView {
                    visible: true,
                    product: Some(product),
                },
            ),
            Err(e) => not_found(store, &e),
        },
        Route::Login { return_url } => store.set(
            LoginFormState::PATH,
            LoginFormState {
                return_url: return_url.clone(),
                ..Default::default()
            },
        ),
        Route::Register => store.set(RegisterFormState::PATH, RegisterFormState::default()),
    }
    route
}

/// The mirror first, then the server.
pub(crate) async fn resolve(id: i64, ctx: &CatalogContext) -> Result<Product, ApiError> {
    match ctx.client.products.cached(id) {
        Some(product) => Ok(product),
        None => ctx.client.products.get_by_id(id).await,
    }
}

fn not_found(store: &StateStore, err: &ApiError) {
    report(store, "Product not found", err);
    if !err.is_session_ending() {
        set_route(store, &Route::Products);
    }
}

