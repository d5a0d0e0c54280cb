//! Request body checks. Failures come back as `{field: [message]}` maps.

use std::collections::BTreeMap;

use catalog_client::{Price, Product};
use serde_json::{json, Value};

use super::ServerError;

pub const REQUIRED: &str = "This field is required.";
pub const NAME_BLANK: &str = "Product name cannot be empty.";
pub const PRICE_NOT_POSITIVE: &str = "Price must be greater than zero.";
pub const PRICE_INVALID: &str = "A valid number is required.";
pub const PRICE_PRECISION: &str = "Ensure that there are no more than 2 decimal places.";
pub const EMAIL_INVALID: &str = "Enter a valid email address.";
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const PASSWORD_SHORT: &str = "This password is too short. It must contain at least 6 characters.";

#[derive(Debug, Default)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `{field: [msg]}` at the top level, as the product endpoints answer.
    pub fn flat(self) -> ServerError {
        ServerError::BadRequest(json!(self.0))
    }

    /// `{"details": {field: [msg]}}`, as registration answers.
    pub fn nested(self) -> ServerError {
        ServerError::BadRequest(json!({ "error": "Invalid data", "details": self.0 }))
    }
}

/// The product after applying `body` on top of `current`.
///
/// Without `current` (create, full replace) `name` and `price` are
/// required and a missing `available` means true.
pub fn product(body: &Value, current: Option<&Product>) -> Result<(String, Price, bool), ServerError> {
    let mut errors = FieldErrors::default();

    let name = match body.get("name") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::String(_)) => {
            errors.add("name", NAME_BLANK);
            None
        }
        Some(Value::Null) | None => {
            if current.is_none() {
                errors.add("name", REQUIRED);
            }
            None
        }
        Some(_) => {
            errors.add("name", "Not a valid string.");
            None
        }
    };

    let price = match body.get("price") {
        Some(Value::Null) | None => {
            if current.is_none() {
                errors.add("price", REQUIRED);
            }
            None
        }
        Some(value) => match parse_price(value) {
            Ok(p) => Some(p),
            Err(message) => {
                errors.add("price", message);
                None
            }
        },
    };

    let available = match body.get("available") {
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::Null) | None => None,
        Some(_) => {
            errors.add("available", "Must be a valid boolean.");
            None
        }
    };

    if !errors.is_empty() {
        return Err(errors.flat());
    }

    match current {
        Some(p) => Ok((
            name.unwrap_or_else(|| p.name.clone()),
            price.unwrap_or(p.price),
            available.unwrap_or(p.available),
        )),
        None => match (name, price) {
            (Some(name), Some(price)) => Ok((name, price, available.unwrap_or(true))),
            _ => Err(ServerError::Internal("validated product lost a field".into())),
        },
    }
}

fn parse_price(value: &Value) -> Result<Price, &'static str> {
    let parsed = match value {
        Value::Number(n) => n.as_f64().ok_or(PRICE_INVALID).and_then(|f| {
            if f <= 0.0 {
                Err(PRICE_NOT_POSITIVE)
            } else {
                Price::from_f64(f).map_err(|_| PRICE_PRECISION)
            }
        }),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(f) if f <= 0.0 => Err(PRICE_NOT_POSITIVE),
            Ok(_) => s.trim().parse::<Price>().map_err(|_| PRICE_PRECISION),
            Err(_) => Err(PRICE_INVALID),
        },
        _ => Err(PRICE_INVALID),
    }?;
    if parsed.is_zero() {
        return Err(PRICE_NOT_POSITIVE);
    }
    Ok(parsed)
}

/// Registration fields, checked the way account signup does.
pub fn registration(body: &Value) -> Result<[String; 5], FieldErrors> {
    let mut errors = FieldErrors::default();
    let field = |name: &str| {
        body.get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    };
    let values = [
        field("first_name"),
        field("last_name"),
        field("email"),
        field("username"),
        body.get("password")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    ];
    for (name, value) in ["first_name", "last_name", "email", "username", "password"]
        .iter()
        .zip(&values)
    {
        if value.is_empty() {
            errors.add(name, REQUIRED);
        }
    }
    let [_, _, email, _, password] = &values;
    if !email.is_empty() && !looks_like_email(email) {
        errors.add("email", EMAIL_INVALID);
    }
    if !password.is_empty() && password.chars().count() < 6 {
        errors.add("password", PASSWORD_SHORT);
    }
    if errors.is_empty() {
        Ok(values)
    } else {
        Err(errors)
    }
}

fn looks_like_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}
