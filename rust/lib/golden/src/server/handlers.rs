//! Axum handlers for `/auth/*` and `/products/*`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use catalog_client::Product;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::jwt::{Claims, TokenKind};
use super::validate::{self, FieldErrors};
use super::{Backend, Hits, ServerError};

type Shared = State<Arc<Backend>>;
type Reply = Result<(StatusCode, Json<Value>), ServerError>;

fn ok(status: StatusCode, body: impl serde::Serialize) -> Reply {
    Ok((status, Json(serde_json::to_value(body)?)))
}

/// Token from `Authorization: Bearer ..` or `Authorization: Token ..`.
fn credentials(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("Token "))
        .map(str::trim)
}

fn authorize(backend: &Backend, headers: &HeaderMap) -> Result<Claims, ServerError> {
    let token = credentials(headers).ok_or_else(|| {
        ServerError::Unauthorized("Authentication credentials were not provided.".into())
    })?;
    backend
        .jwt()
        .verify(token, TokenKind::Access)
        .map_err(|e| ServerError::Unauthorized(format!("Given token not valid: {}", e)))
}

fn text<'a>(body: &'a Value, field: &str) -> &'a str {
    body.get(field).and_then(Value::as_str).unwrap_or_default()
}

// ── Auth ───────────────────────────────────────────────────────────

pub async fn login(State(backend): Shared, Json(body): Json<Value>) -> Reply {
    Hits::bump(&backend.hits().login);
    let username = text(&body, "username").trim();
    let password = text(&body, "password");
    if username.is_empty() || password.is_empty() {
        return Err(ServerError::BadRequest(
            json!({ "error": "Username and password are required" }),
        ));
    }

    let user = backend
        .authenticate(username, password)?
        .ok_or_else(|| ServerError::Unauthorized("Invalid credentials".into()))?;

    let jwt = backend.jwt();
    let access = jwt
        .issue(TokenKind::Access, &user.username, user.id)
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    let refresh = jwt
        .issue(TokenKind::Refresh, &user.username, user.id)
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    info!(user = %user.username, "login");

    ok(
        StatusCode::OK,
        json!({
            "access_token": access,
            "refresh_token": refresh,
            "user": user,
            "expires_in": jwt.access_ttl().max(0),
        }),
    )
}

pub async fn register(State(backend): Shared, Json(body): Json<Value>) -> Reply {
    Hits::bump(&backend.hits().register);
    let [first_name, last_name, email, username, password] =
        validate::registration(&body).map_err(FieldErrors::nested)?;

    if backend.user_exists(&username)? {
        let mut errors = FieldErrors::default();
        errors.add("username", validate::USERNAME_TAKEN);
        return Err(errors.nested());
    }

    let user = backend.add_user(&username, &password, &email, &first_name, &last_name)?;
    info!(user = %user.username, "registered");
    ok(StatusCode::CREATED, user)
}

pub async fn logout(State(backend): Shared, headers: HeaderMap) -> Reply {
    Hits::bump(&backend.hits().logout);
    let claims = authorize(&backend, &headers)?;
    debug!(user = %claims.sub, "logout");
    ok(StatusCode::OK, json!({ "message": "Logged out" }))
}

pub async fn refresh(State(backend): Shared, Json(body): Json<Value>) -> Reply {
    Hits::bump(&backend.hits().refresh);
    let token = text(&body, "refresh_token");
    if token.is_empty() {
        return Err(ServerError::BadRequest(
            json!({ "error": "Refresh token is required" }),
        ));
    }
    let claims = backend
        .jwt()
        .verify(token, TokenKind::Refresh)
        .map_err(|e| ServerError::Unauthorized(e.to_string()))?;
    if backend.find_user(&claims.sub)?.is_none() {
        return Err(ServerError::Unauthorized("User not found".into()));
    }
    let access = backend
        .jwt()
        .issue(TokenKind::Access, &claims.sub, claims.uid)
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    debug!(user = %claims.sub, "access token refreshed");
    ok(StatusCode::OK, json!({ "access_token": access }))
}

// ── Products ───────────────────────────────────────────────────────

fn guard(backend: &Backend, headers: &HeaderMap) -> Result<(), ServerError> {
    Hits::bump(&backend.hits().products);
    authorize(backend, headers).map(|_| ())
}

pub async fn list_products(State(backend): Shared, headers: HeaderMap) -> Reply {
    guard(&backend, &headers)?;
    ok(StatusCode::OK, backend.products()?)
}

pub async fn list_available(State(backend): Shared, headers: HeaderMap) -> Reply {
    guard(&backend, &headers)?;
    let items: Vec<Product> = backend
        .products()?
        .into_iter()
        .filter(|p| p.available)
        .collect();
    ok(StatusCode::OK, items)
}

pub async fn create_product(
    State(backend): Shared,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    guard(&backend, &headers)?;
    let (name, price, available) = validate::product(&body, None)?;
    let product = backend.insert_product(&name, price, available)?;
    info!(id = product.id, name = %product.name, "product created");
    ok(StatusCode::CREATED, product)
}

pub async fn get_product(
    State(backend): Shared,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Reply {
    guard(&backend, &headers)?;
    ok(StatusCode::OK, backend.product(id)?)
}

pub async fn replace_product(
    State(backend): Shared,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    guard(&backend, &headers)?;
    let current = backend.product(id)?;
    let fields = validate::product(&body, None)?;
    ok(StatusCode::OK, save(&backend, current, fields)?)
}

pub async fn update_product(
    State(backend): Shared,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Reply {
    guard(&backend, &headers)?;
    let current = backend.product(id)?;
    let fields = validate::product(&body, Some(&current))?;
    ok(StatusCode::OK, save(&backend, current, fields)?)
}

pub async fn delete_product(
    State(backend): Shared,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    guard(&backend, &headers)?;
    backend.remove_product(id)?;
    info!(id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn save(
    backend: &Backend,
    mut product: Product,
    (name, price, available): (String, catalog_client::Price, bool),
) -> Result<Product, ServerError> {
    product.name = name;
    product.price = price;
    product.available = available;
    product.updated_at = Some(chrono::Utc::now());
    backend.put_product(&product)?;
    debug!(id = product.id, "product saved");
    Ok(product)
}
