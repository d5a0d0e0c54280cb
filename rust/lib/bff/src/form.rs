//! Form models and their local validation.
//!
//! A form that fails validation never reaches the network; the handler
//! puts the [`FieldErrors`] back into view state instead.

use std::collections::BTreeMap;

use catalog_client::{NewProduct, Price, PriceError, RegisterRequest};
use serde::Serialize;

/// Field name to the first problem found with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` unless the field already has one.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

fn required(errors: &mut FieldErrors, field: &str, value: &str, label: &str) {
    if value.trim().is_empty() {
        errors.add(field, format!("{} is required", label));
    }
}

fn min_chars(errors: &mut FieldErrors, field: &str, value: &str, label: &str, min: usize) {
    if value.chars().count() < min {
        errors.add(field, format!("{} must be at least {} characters", label, min));
    }
}

/// `local@domain` with no whitespace and no empty domain labels.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain.split('.').all(|label| !label.is_empty())
}

// ── Product ────────────────────────────────────────────────────────

/// Create/edit dialog contents. `price` is kept as typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductForm {
    /// Present when editing an existing product.
    pub id: Option<i64>,
    pub name: String,
    pub price: String,
    pub available: bool,
}

impl ProductForm {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn from_product(p: &catalog_client::Product) -> Self {
        Self {
            id: Some(p.id),
            name: p.name.clone(),
            price: p.price.to_string(),
            available: p.available,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    pub fn title(&self) -> &'static str {
        if self.is_edit() {
            "Edit product"
        } else {
            "New product"
        }
    }

    pub fn validate(&self) -> Result<NewProduct, FieldErrors> {
        let mut errors = FieldErrors::new();
        required(&mut errors, "name", &self.name, "Name");

        let mut price = Price::ZERO;
        if self.price.trim().is_empty() {
            errors.add("price", "Price is required");
        } else {
            match self.price.parse::<Price>() {
                Ok(p) => price = p,
                Err(PriceError::Negative) => errors.add("price", "Price must be zero or more"),
                Err(PriceError::TooPrecise) => {
                    errors.add("price", "Price allows at most two decimals")
                }
                Err(PriceError::Invalid(_)) => errors.add("price", "Price must be a number"),
            }
        }

        errors.into_result(|| NewProduct::new(self.name.trim(), price, self.available))
    }
}

// ── Login ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoginForm {
    pub username: String,
    #[serde(skip)]
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        required(&mut errors, "username", &self.username, "Username");
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }
        errors.into_result(|| ())
    }
}

// ── Register ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    #[serde(skip)]
    pub password: String,
    #[serde(skip)]
    pub confirm_password: String,
}

/// Register fields in display order, with their labels.
pub const REGISTER_LABELS: [(&str, &str); 5] = [
    ("username", "Username"),
    ("email", "Email"),
    ("password", "Password"),
    ("first_name", "First name"),
    ("last_name", "Last name"),
];

impl RegisterForm {
    pub fn validate(&self) -> Result<RegisterRequest, FieldErrors> {
        let mut errors = FieldErrors::new();
        required(&mut errors, "first_name", &self.first_name, "First name");
        required(&mut errors, "last_name", &self.last_name, "Last name");

        required(&mut errors, "email", &self.email, "Email");
        if !is_valid_email(self.email.trim()) {
            errors.add("email", "Email is not valid");
        }

        required(&mut errors, "username", &self.username, "Username");
        min_chars(&mut errors, "username", &self.username, "Username", 3);

        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }
        min_chars(&mut errors, "password", &self.password, "Password", 6);

        if self.confirm_password.is_empty() {
            errors.add("confirm_password", "Confirm your password");
        } else if self.confirm_password != self.password {
            errors.add("confirm_password", "Passwords do not match");
        }

        errors.into_result(|| RegisterRequest {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            username: self.username.trim().to_string(),
            password: self.password.clone(),
        })
    }
}
