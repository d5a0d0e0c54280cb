//! Wire types shared by the client, the view layer and the reference server.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ── Price ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PriceError {
    #[error("price must not be negative")]
    Negative,
    #[error("price has more than two decimal places")]
    TooPrecise,
    #[error("price is not a number: {0}")]
    Invalid(String),
}

/// Non-negative money amount with two decimal places, held as cents.
///
/// Reads JSON numbers and decimal strings (`9.99`, `"9.99"`); writes a
/// JSON number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(u64);

impl Price {
    pub const ZERO: Price = Price(0);

    pub fn from_cents(cents: u64) -> Self {
        Price(cents)
    }

    pub fn cents(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn from_f64(value: f64) -> Result<Self, PriceError> {
        if !value.is_finite() {
            return Err(PriceError::Invalid(value.to_string()));
        }
        if value < 0.0 {
            return Err(PriceError::Negative);
        }
        let scaled = value * 100.0;
        let cents = scaled.round();
        if (scaled - cents).abs() > 1e-6 {
            return Err(PriceError::TooPrecise);
        }
        Ok(Price(cents as u64))
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || PriceError::Invalid(s.to_string());
        if let Some(rest) = s.strip_prefix('-') {
            return match rest.parse::<Price>() {
                Ok(p) if p.is_zero() => Ok(p),
                Ok(_) => Err(PriceError::Negative),
                Err(e) => Err(e),
            };
        }
        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > 2 {
            return Err(PriceError::TooPrecise);
        }
        let whole: u64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac: u64 = format!("{:0<2}", frac).parse().map_err(|_| invalid())?;
        whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .map(Price)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PriceVisitor;

        impl Visitor<'_> for PriceVisitor {
            type Value = Price;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative amount with at most two decimals")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Price, E> {
                v.checked_mul(100)
                    .map(Price)
                    .ok_or_else(|| E::custom("price out of range"))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Price, E> {
                if v < 0 {
                    return Err(E::custom(PriceError::Negative));
                }
                self.visit_u64(v as u64)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Price, E> {
                Price::from_f64(v).map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Price, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(PriceVisitor)
    }
}

// ── Product ────────────────────────────────────────────────────────

/// A product as the server returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for create and full replace; the server assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub available: bool,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: Price, available: bool) -> Self {
        Self {
            name: name.into(),
            price,
            available,
        }
    }
}

impl From<&Product> for NewProduct {
    fn from(p: &Product) -> Self {
        Self::new(p.name.clone(), p.price, p.available)
    }
}

/// Partial update; absent fields are left alone by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.available.is_none()
    }
}

impl From<NewProduct> for ProductPatch {
    fn from(p: NewProduct) -> Self {
        Self {
            name: Some(p.name),
            price: Some(p.price),
            available: Some(p.available),
        }
    }
}

// ── Auth ───────────────────────────────────────────────────────────

/// Profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "firstName", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, alias = "lastName", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl User {
    /// Two-letter badge for the header.
    pub fn initials(&self) -> String {
        let words: Vec<&str> = self.username.split_whitespace().collect();
        let letters: String = match words.as_slice() {
            [] => return "U".to_string(),
            [first, second, ..] => first.chars().take(1).chain(second.chars().take(1)).collect(),
            [only] => only.chars().take(2).collect(),
        };
        letters.to_uppercase()
    }

    /// "First Last" when the profile has names, else the username.
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> User {
        User {
            id: 1,
            username: name.into(),
            email: String::new(),
            first_name: None,
            last_name: None,
        }
    }

    // ── Price ──

    #[test]
    fn price_parses_decimal_strings() {
        assert_eq!("9.99".parse::<Price>().unwrap().cents(), 999);
        assert_eq!("2500.00".parse::<Price>().unwrap().cents(), 250_000);
        assert_eq!("10".parse::<Price>().unwrap().cents(), 1000);
        assert_eq!(" 0.5 ".parse::<Price>().unwrap().cents(), 50);
        assert_eq!(".5".parse::<Price>().unwrap().cents(), 50);
        assert_eq!("-0".parse::<Price>().unwrap(), Price::ZERO);
    }

    #[test]
    fn price_rejects_bad_input() {
        assert_eq!("-1".parse::<Price>(), Err(PriceError::Negative));
        assert_eq!("1.999".parse::<Price>(), Err(PriceError::TooPrecise));
        assert!(matches!("abc".parse::<Price>(), Err(PriceError::Invalid(_))));
        assert!(matches!("".parse::<Price>(), Err(PriceError::Invalid(_))));
        assert!(matches!("1.2.3".parse::<Price>(), Err(PriceError::Invalid(_))));
    }

    #[test]
    fn price_json_number_and_string() {
        let p: Price = serde_json::from_str("9.99").unwrap();
        assert_eq!(p.cents(), 999);
        let p: Price = serde_json::from_str("\"899.99\"").unwrap();
        assert_eq!(p.cents(), 89_999);
        let p: Price = serde_json::from_str("12").unwrap();
        assert_eq!(p.cents(), 1200);

        assert!(serde_json::from_str::<Price>("-3").is_err());
        assert!(serde_json::from_str::<Price>("1.234").is_err());
        assert_eq!(serde_json::to_string(&Price::from_cents(999)).unwrap(), "9.99");
    }

    #[test]
    fn price_display_pads_cents() {
        assert_eq!(Price::from_cents(5).to_string(), "0.05");
        assert_eq!(Price::from_cents(129_990).to_string(), "1299.90");
    }

    // ── Product ──

    #[test]
    fn product_from_server_json() {
        let json = r#"{
            "id": 3,
            "name": "Fone Bluetooth JBL",
            "price": "149.50",
            "available": false,
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-02T10:00:00Z"
        }"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.id, 3);
        assert_eq!(p.price, Price::from_cents(14_950));
        assert!(!p.available);
        assert!(p.created_at.is_some());
    }

    #[test]
    fn patch_skips_absent_fields() {
        let patch = ProductPatch {
            price: Some(Price::from_cents(100)),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"price":1.0}"#);
        assert!(ProductPatch::default().is_empty());
        let full: ProductPatch = NewProduct::new("A", Price::ZERO, true).into();
        assert!(!full.is_empty());
    }

    // ── User ──

    #[test]
    fn user_accepts_camel_case_names() {
        let u: User = serde_json::from_str(
            r#"{"id":7,"username":"alice","email":"a@x.io","firstName":"Alice","lastName":"Liddell"}"#,
        )
        .unwrap();
        assert_eq!(u.first_name.as_deref(), Some("Alice"));
        assert_eq!(u.display_name(), "Alice Liddell");
    }

    #[test]
    fn initials() {
        assert_eq!(user("alice").initials(), "AL");
        assert_eq!(user("mary jane").initials(), "MJ");
        assert_eq!(user("x").initials(), "X");
        assert_eq!(user("").initials(), "U");
        assert_eq!(user("").display_name(), "");
    }
}
