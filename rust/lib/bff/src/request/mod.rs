//! User intents. Each request type is emitted at its `PATH`.

pub mod app;
pub mod auth;
pub mod product;

pub use app::{DismissReq, InitializeReq, NavigateReq};
pub use auth::{LoginReq, LogoutReq, RegisterReq};
pub use product::{
    AskDeleteReq, CancelDeleteReq, CancelProductReq, CloseDetailReq, ConfirmDeleteReq,
    EditProductReq, LoadAvailableReq, LoadProductsReq, NewProductReq, SaveProductReq,
    ViewProductReq,
};
