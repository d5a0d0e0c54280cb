//! View state. Each type lives at one well-known path, named by its `PATH`.

pub mod app;
pub mod auth;
pub mod product;
pub mod products;

pub use app::{AppRoute, Notification, Notifications, Severity};
pub use auth::{AuthPhase, AuthState, LoginFormState, RegisterFormState, UserProfile};
pub use product::{DeleteDialog, ProductDetailView, ProductFormState};
pub use products::{ListFilter, ProductListView};
