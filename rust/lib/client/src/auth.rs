use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use tracing::{info, warn};

use crate::authorizer::{
    decode, ensure_success, TokenRefresher, LOGIN_PATH, LOGOUT_PATH, REFRESH_PATH, REGISTER_PATH,
};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::model::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterRequest, User};
use crate::session::SessionStore;

/// Login, registration, logout and token refresh against `auth/*`.
pub struct AuthGateway {
    http: reqwest::Client,
    config: ClientConfig,
    session: Arc<SessionStore>,
}

impl AuthGateway {
    pub fn new(http: reqwest::Client, config: ClientConfig, session: Arc<SessionStore>) -> Self {
        Self {
            http,
            config,
            session,
        }
    }

    /// Exchange credentials for a session. The session is stored on success.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, ApiError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let resp = self
            .http
            .post(self.config.url(LOGIN_PATH))
            .json(&body)
            .send()
            .await?;
        let login: LoginResponse = decode(ensure_success(resp).await?).await?;
        self.session.set_session(&login)?;
        info!(user = %login.user.username, "logged in");
        Ok(login.user)
    }

    /// Create an account. Does not sign in.
    pub async fn register(&self, req: &RegisterRequest) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.config.url(REGISTER_PATH))
            .json(req)
            .send()
            .await?;
        ensure_success(resp).await?;
        info!(user = %req.username, "registered");
        Ok(())
    }

    /// Tell the server, then always drop the local session.
    ///
    /// A failed server call is only logged; the user ends up signed out
    /// either way.
    pub async fn logout(&self) -> Result<(), ApiError> {
        if let Some(token) = self.session.token() {
            let sent = self
                .http
                .post(self.config.url(LOGOUT_PATH))
                .header(AUTHORIZATION, self.config.authorization(&token))
                .json(&serde_json::json!({}))
                .send()
                .await;
            let outcome = match sent {
                Ok(resp) => ensure_success(resp).await.map(|_| ()),
                Err(e) => Err(ApiError::from(e)),
            };
            if let Err(e) = outcome {
                warn!("server logout failed: {} ({})", e, e.detail().unwrap_or(""));
            }
        }
        self.session.clear()?;
        info!("logged out");
        Ok(())
    }

    /// Trade the refresh token for a new access token.
    ///
    /// Any failure clears the session and yields [`ApiError::SessionExpired`].
    pub async fn refresh_token(&self) -> Result<String, ApiError> {
        match self.try_refresh().await {
            Ok(token) => Ok(token),
            Err(e) => {
                if let Err(clear) = self.session.clear() {
                    warn!("failed to clear session: {}", clear);
                }
                let detail = e.detail().map(str::to_string).unwrap_or_else(|| e.to_string());
                Err(ApiError::SessionExpired(detail))
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.has_valid_token()
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    async fn try_refresh(&self) -> Result<String, ApiError> {
        let refresh_token = self
            .session
            .refresh_token()
            .ok_or_else(|| ApiError::SessionExpired("no refresh token".into()))?;
        let resp = self
            .http
            .post(self.config.url(REFRESH_PATH))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;
        let fresh: RefreshResponse = decode(ensure_success(resp).await?).await?;
        self.session.set_access_token(&fresh.access_token)?;
        info!("access token refreshed");
        Ok(fresh.access_token)
    }
}

#[async_trait]
impl TokenRefresher for AuthGateway {
    async fn refresh(&self) -> Result<String, ApiError> {
        self.refresh_token().await
    }
}
