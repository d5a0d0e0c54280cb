use catalog_client::Product;
use serde::Serialize;

use crate::form::{FieldErrors, ProductForm};

/// The create/edit dialog.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFormState {
    pub visible: bool,
    pub title: String,
    pub form: ProductForm,
    pub errors: FieldErrors,
    pub busy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProductFormState {
    pub const PATH: &'static str = "product/form";

    pub fn open(form: ProductForm) -> Self {
        Self {
            visible: true,
            title: form.title().to_string(),
            form,
            ..Default::default()
        }
    }

    pub fn closed() -> Self {
        Self::default()
    }
}

/// Read-only product dialog.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductDetailView {
    pub visible: bool,
    pub product: Option<Product>,
}

impl ProductDetailView {
    pub const PATH: &'static str = "product/detail";
}

/// Delete confirmation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeleteDialog {
    pub visible: bool,
    pub product: Option<Product>,
    pub busy: bool,
}

impl DeleteDialog {
    pub const PATH: &'static str = "product/delete";
}
