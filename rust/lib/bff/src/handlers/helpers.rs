//! Shared helpers for handlers.

use catalog_client::ApiError;
use catalog_flux::StateStore;

use crate::route::Route;
use crate::state::*;

pub const INVALID_DATA: &str = "Invalid data. Check the fields.";
pub const SERVER_ERROR: &str = "Server error. Try again.";
pub const CANNOT_CONNECT: &str = "Cannot connect to the server.";
pub const WRONG_CREDENTIALS: &str = "Wrong username or password.";

/// Push a toast and return its id.
pub fn notify(store: &StateStore, severity: Severity, summary: &str, detail: &str) -> u64 {
    let mut list = store
        .get_cloned::<Notifications>(Notifications::PATH)
        .unwrap_or_default();
    let id = list.push(severity, summary, detail);
    store.set(Notifications::PATH, list);
    id
}

pub fn set_route(store: &StateStore, route: &Route) {
    store.set(AppRoute::PATH, AppRoute(route.to_string()));
}

pub fn current_route(store: &StateStore) -> Route {
    store
        .get_cloned::<AppRoute>(AppRoute::PATH)
        .map(|r| Route::parse(&r.0))
        .unwrap_or(Route::Products)
}

/// The flat message, with the server's text when it sent any.
pub fn error_text(err: &ApiError) -> String {
    match err.detail() {
        Some(detail) => format!("{} ({})", err, detail),
        None => err.to_string(),
    }
}

/// Turn a failed call into a toast.
///
/// Session-ending failures get their own message; the session watcher
/// takes care of routing to login.
pub fn report(store: &StateStore, summary: &str, err: &ApiError) {
    if err.is_session_ending() {
        notify(
            store,
            Severity::Error,
            "Session expired",
            "Sign in again to continue.",
        );
    } else {
        notify(store, Severity::Error, summary, &error_text(err));
    }
}

/// Close dialogs and empty the product table.
pub fn reset_views(store: &StateStore) {
    store.set(ProductListView::PATH, ProductListView::default());
    store.set(ProductFormState::PATH, ProductFormState::closed());
    store.set(ProductDetailView::PATH, ProductDetailView::default());
    store.set(DeleteDialog::PATH, DeleteDialog::default());
}
