use crate::form::{LoginForm, RegisterForm};

#[derive(Debug, Clone)]
pub struct LoginReq {
    pub form: LoginForm,
}

impl LoginReq {
    pub const PATH: &'static str = "auth/login";

    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            form: LoginForm::new(username, password),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogoutReq;

impl LogoutReq {
    pub const PATH: &'static str = "auth/logout";
}

#[derive(Debug, Clone)]
pub struct RegisterReq {
    pub form: RegisterForm,
}

impl RegisterReq {
    pub const PATH: &'static str = "auth/register";
}
