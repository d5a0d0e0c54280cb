use catalog_client::User;
use serde::Serialize;

use crate::form::{FieldErrors, LoginForm, RegisterForm};

/// What the header and the login screen render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    pub phase: AuthPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    pub busy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthState {
    pub const PATH: &'static str = "auth/state";

    pub fn anonymous() -> Self {
        Self {
            phase: AuthPhase::Unauthenticated,
            user: None,
            busy: false,
            error: None,
        }
    }

    pub fn signed_in(user: &User) -> Self {
        Self {
            phase: AuthPhase::Authenticated,
            user: Some(UserProfile::from(user)),
            busy: false,
            error: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.phase == AuthPhase::Authenticated
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AuthPhase {
    Unauthenticated,
    Authenticated,
}

/// Header badge data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub initials: String,
}

impl From<&User> for UserProfile {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            email: u.email.clone(),
            display_name: u.display_name(),
            initials: u.initials(),
        }
    }
}

/// Login screen. The password is never kept in state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginFormState {
    pub username: String,
    /// Where to go after a successful login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,
    pub errors: FieldErrors,
}

impl LoginFormState {
    pub const PATH: &'static str = "login/form";

    pub fn rejected(form: &LoginForm, return_url: Option<String>, errors: FieldErrors) -> Self {
        Self {
            username: form.username.clone(),
            return_url,
            errors,
        }
    }
}

/// Register screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterFormState {
    pub form: RegisterForm,
    pub errors: FieldErrors,
    pub busy: bool,
}

impl RegisterFormState {
    pub const PATH: &'static str = "register/form";
}
