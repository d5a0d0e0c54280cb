use catalog_client::ProductPatch;
use catalog_flux::StateStore;

use super::app_handlers::{navigate, resolve};
use super::helpers::{error_text, notify, report, set_route};
use super::CatalogContext;
use crate::form::FieldErrors;
use crate::request::*;
use crate::route::Route;
use crate::state::*;

// ── List ───────────────────────────────────────────────────────────

pub async fn handle_load(_req: &LoadProductsReq, store: &StateStore, ctx: &CatalogContext) {
    load_all(store, ctx).await;
}

/// Reload the mirror and show all of it.
pub(crate) async fn load_all(store: &StateStore, ctx: &CatalogContext) {
    set_loading(store, ListFilter::All);
    let result = ctx.client.products.list().await;

    let mut view = list_view(store);
    view.loading = false;
    match result {
        Ok(items) => {
            view.items = view.rows_from(&items);
            view.error = None;
            store.set(ProductListView::PATH, view);
        }
        Err(e) => {
            view.error = Some(error_text(&e));
            store.set(ProductListView::PATH, view);
            report(store, "Could not load products", &e);
        }
    }
}

/// Ask the server for available products only. The mirror is untouched.
pub async fn handle_load_available(
    _req: &LoadAvailableReq,
    store: &StateStore,
    ctx: &CatalogContext,
) {
    set_loading(store, ListFilter::AvailableOnly);
    let result = ctx.client.products.list_available().await;

    let mut view = list_view(store);
    view.loading = false;
    match result {
        Ok(items) => {
            view.items = items;
            view.error = None;
            store.set(ProductListView::PATH, view);
        }
        Err(e) => {
            view.error = Some(error_text(&e));
            store.set(ProductListView::PATH, view);
            report(store, "Could not load products", &e);
        }
    }
}

fn list_view(store: &StateStore) -> ProductListView {
    store
        .get_cloned::<ProductListView>(ProductListView::PATH)
        .unwrap_or_default()
}

fn set_loading(store: &StateStore, filter: ListFilter) {
    let mut view = list_view(store);
    view.filter = filter;
    view.loading = true;
    view.error = None;
    store.set(ProductListView::PATH, view);
}

// ── Create / edit ──────────────────────────────────────────────────

pub async fn handle_new(_req: &NewProductReq, store: &StateStore, ctx: &CatalogContext) {
    navigate(&Route::ProductNew.to_string(), store, ctx).await;
}

pub async fn handle_edit(req: &EditProductReq, store: &StateStore, ctx: &CatalogContext) {
    navigate(&Route::ProductEdit(req.id).to_string(), store, ctx).await;
}

pub async fn handle_save(req: &SaveProductReq, store: &StateStore, ctx: &CatalogContext) {
    let form = &req.form;
    let mut dialog = ProductFormState::open(form.clone());

    let product = match form.validate() {
        Ok(product) => product,
        Err(errors) => {
            dialog.errors = errors;
            store.set(ProductFormState::PATH, dialog);
            return;
        }
    };

    dialog.busy = true;
    store.set(ProductFormState::PATH, dialog.clone());

    let result = match form.id {
        Some(id) => {
            ctx.client
                .products
                .update(id, &ProductPatch::from(product))
                .await
        }
        None => ctx.client.products.create(&product).await,
    };

    match result {
        Ok(saved) => {
            store.set(ProductFormState::PATH, ProductFormState::closed());
            let summary = if form.is_edit() {
                "Product updated"
            } else {
                "Product created"
            };
            notify(store, Severity::Success, summary, &saved.name);
            set_route(store, &Route::Products);
        }
        Err(e) if e.is_session_ending() => report(store, "Could not save product", &e),
        Err(e) => {
            dialog.busy = false;
            dialog.error = Some(error_text(&e));
            dialog.errors = FieldErrors::new();
            if let Some(fields) = e.field_errors() {
                for (field, messages) in fields {
                    if let Some(first) = messages.first() {
                        dialog.errors.add(field, first.clone());
                    }
                }
            }
            store.set(ProductFormState::PATH, dialog);
            report(store, "Could not save product", &e);
        }
    }
}

pub async fn handle_cancel(_req: &CancelProductReq, store: &StateStore, _ctx: &CatalogContext) {
    store.set(ProductFormState::PATH, ProductFormState::closed());
    set_route(store, &Route::Products);
}

// ── Detail ─────────────────────────────────────────────────────────

pub async fn handle_view(req: &ViewProductReq, store: &StateStore, ctx: &CatalogContext) {
    navigate(&Route::ProductDetail(req.id).to_string(), store, ctx).await;
}

pub async fn handle_close(_req: &CloseDetailReq, store: &StateStore, _ctx: &CatalogContext) {
    store.set(ProductDetailView::PATH, ProductDetailView::default());
    set_route(store, &Route::Products);
}

// ── Delete ─────────────────────────────────────────────────────────

pub async fn handle_ask_delete(req: &AskDeleteReq, store: &StateStore, ctx: &CatalogContext) {
    match resolve(req.id, ctx).await {
        Ok(product) => store.set(
            DeleteDialog::PATH,
            DeleteDialog {
                visible: true,
                product: Some(product),
                busy: false,
            },
        ),
        Err(e) => report(store, "Product not found", &e),
    }
}

pub async fn handle_confirm_delete(
    _req: &ConfirmDeleteReq,
    store: &StateStore,
    ctx: &CatalogContext,
) {
    let Some(mut dialog) = store.get_cloned::<DeleteDialog>(DeleteDialog::PATH) else {
        return;
    };
    let Some(product) = dialog.product.clone() else {
        return;
    };
    dialog.busy = true;
    store.set(DeleteDialog::PATH, dialog);

    let result = ctx.client.products.delete(product.id).await;
    store.set(DeleteDialog::PATH, DeleteDialog::default());
    match result {
        Ok(()) => {
            notify(store, Severity::Success, "Product removed", &product.name);
        }
        Err(e) => report(store, "Could not remove product", &e),
    }
}

pub async fn handle_cancel_delete(
    _req: &CancelDeleteReq,
    store: &StateStore,
    _ctx: &CatalogContext,
) {
    store.set(DeleteDialog::PATH, DeleteDialog::default());
}
