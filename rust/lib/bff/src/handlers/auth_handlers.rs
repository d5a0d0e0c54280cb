use catalog_client::ApiError;
use catalog_flux::StateStore;
use tracing::warn;

use super::app_handlers::navigate;
use super::helpers::{notify, reset_views, CANNOT_CONNECT, INVALID_DATA, SERVER_ERROR, WRONG_CREDENTIALS};
use super::CatalogContext;
use crate::form::{FieldErrors, REGISTER_LABELS};
use crate::request::{LoginReq, LogoutReq, RegisterReq};
use crate::route::Route;
use crate::state::*;

pub async fn handle_login(req: &LoginReq, store: &StateStore, ctx: &CatalogContext) {
    let return_url = store
        .get_cloned::<LoginFormState>(LoginFormState::PATH)
        .and_then(|f| f.return_url);

    if let Err(errors) = req.form.validate() {
        store.set(
            LoginFormState::PATH,
            LoginFormState::rejected(&req.form, return_url, errors),
        );
        return;
    }

    let mut auth = store
        .get_cloned::<AuthState>(AuthState::PATH)
        .unwrap_or_else(AuthState::anonymous);
    auth.busy = true;
    auth.error = None;
    store.set(AuthState::PATH, auth);

    let username = req.form.username.trim();
    match ctx.client.auth.login(username, &req.form.password).await {
        Ok(user) => {
            store.set(AuthState::PATH, AuthState::signed_in(&user));
            store.set(LoginFormState::PATH, LoginFormState::default());
            notify(
                store,
                Severity::Success,
                "Signed in",
                &format!("Welcome, {}!", user.username),
            );
            let target = return_url.unwrap_or_else(|| Route::HOME.to_string());
            navigate(&target, store, ctx).await;
        }
        Err(e) => {
            let message = login_error_message(&e).to_string();
            store.set(
                AuthState::PATH,
                AuthState {
                    error: Some(message.clone()),
                    ..AuthState::anonymous()
                },
            );
            store.set(
                LoginFormState::PATH,
                LoginFormState::rejected(&req.form, return_url, FieldErrors::new()),
            );
            notify(store, Severity::Error, "Login failed", &message);
        }
    }
}

/// Local sign-out always succeeds, whatever the server says.
pub async fn handle_logout(_req: &LogoutReq, store: &StateStore, ctx: &CatalogContext) {
    if let Err(e) = ctx.client.auth.logout().await {
        warn!("logout: {}", e);
    }
    reset_views(store);
    store.set(AuthState::PATH, AuthState::anonymous());
    notify(store, Severity::Info, "Signed out", "You have been signed out.");
    navigate("/login", store, ctx).await;
}

pub async fn handle_register(req: &RegisterReq, store: &StateStore, ctx: &CatalogContext) {
    let mut state = RegisterFormState {
        form: req.form.clone(),
        errors: FieldErrors::new(),
        busy: false,
    };
    let request = match req.form.validate() {
        Ok(request) => request,
        Err(errors) => {
            state.errors = errors;
            store.set(RegisterFormState::PATH, state);
            return;
        }
    };

    state.busy = true;
    store.set(RegisterFormState::PATH, state.clone());

    match ctx.client.auth.register(&request).await {
        Ok(()) => {
            store.set(RegisterFormState::PATH, RegisterFormState::default());
            notify(
                store,
                Severity::Success,
                "Account created",
                "Your account was created. Sign in to continue.",
            );
            navigate("/login", store, ctx).await;
        }
        Err(e) => {
            state.busy = false;
            if let Some(fields) = e.field_errors() {
                for (field, messages) in fields {
                    if let Some(first) = messages.first() {
                        state.errors.add(field, first.clone());
                    }
                }
            }
            store.set(RegisterFormState::PATH, state);
            notify(store, Severity::Error, "Registration failed", &register_error_text(&e));
        }
    }
}

pub fn login_error_message(err: &ApiError) -> &'static str {
    match err {
        ApiError::Unauthorized(_) => WRONG_CREDENTIALS,
        ApiError::InvalidInput(_) | ApiError::Validation { .. } => INVALID_DATA,
        ApiError::NetworkUnreachable(_) => CANNOT_CONNECT,
        _ => SERVER_ERROR,
    }
}

/// One line per rejected field, `Label: message`, known fields first.
pub fn register_error_text(err: &ApiError) -> String {
    match err {
        ApiError::Validation { fields, .. } => {
            let label = |field: &str| {
                REGISTER_LABELS
                    .iter()
                    .find(|(name, _)| *name == field)
                    .map(|(_, label)| label.to_string())
                    .unwrap_or_else(|| field.to_string())
            };
            let mut order: Vec<&str> = REGISTER_LABELS.iter().map(|(name, _)| *name).collect();
            order.extend(
                fields
                    .keys()
                    .map(String::as_str)
                    .filter(|f| !REGISTER_LABELS.iter().any(|(name, _)| name == f)),
            );
            let lines: Vec<String> = order
                .into_iter()
                .filter_map(|field| {
                    let first = fields.get(field)?.first()?;
                    Some(format!("{}: {}", label(field), first))
                })
                .collect();
            if lines.is_empty() {
                INVALID_DATA.to_string()
            } else {
                lines.join("\n")
            }
        }
        ApiError::InvalidInput(message) if !message.is_empty() => message.clone(),
        ApiError::InvalidInput(_) => INVALID_DATA.to_string(),
        ApiError::NetworkUnreachable(_) => CANNOT_CONNECT.to_string(),
        _ => SERVER_ERROR.to_string(),
    }
}
