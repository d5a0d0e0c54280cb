use crate::form::ProductForm;

#[derive(Debug, Clone)]
pub struct LoadProductsReq;

impl LoadProductsReq {
    pub const PATH: &'static str = "products/load";
}

/// Show only products the server reports as available.
#[derive(Debug, Clone)]
pub struct LoadAvailableReq;

impl LoadAvailableReq {
    pub const PATH: &'static str = "products/load-available";
}

/// Open a blank create dialog.
#[derive(Debug, Clone)]
pub struct NewProductReq;

impl NewProductReq {
    pub const PATH: &'static str = "product/new";
}

#[derive(Debug, Clone)]
pub struct EditProductReq {
    pub id: i64,
}

impl EditProductReq {
    pub const PATH: &'static str = "product/edit";
}

/// Submit the dialog. Creates when `form.id` is empty, updates otherwise.
#[derive(Debug, Clone)]
pub struct SaveProductReq {
    pub form: ProductForm,
}

impl SaveProductReq {
    pub const PATH: &'static str = "product/save";
}

#[derive(Debug, Clone)]
pub struct CancelProductReq;

impl CancelProductReq {
    pub const PATH: &'static str = "product/cancel";
}

#[derive(Debug, Clone)]
pub struct ViewProductReq {
    pub id: i64,
}

impl ViewProductReq {
    pub const PATH: &'static str = "product/view";
}

#[derive(Debug, Clone)]
pub struct CloseDetailReq;

impl CloseDetailReq {
    pub const PATH: &'static str = "product/close";
}

#[derive(Debug, Clone)]
pub struct AskDeleteReq {
    pub id: i64,
}

impl AskDeleteReq {
    pub const PATH: &'static str = "product/ask-delete";
}

#[derive(Debug, Clone)]
pub struct ConfirmDeleteReq;

impl ConfirmDeleteReq {
    pub const PATH: &'static str = "product/confirm-delete";
}

#[derive(Debug, Clone)]
pub struct CancelDeleteReq;

impl CancelDeleteReq {
    pub const PATH: &'static str = "product/cancel-delete";
}
