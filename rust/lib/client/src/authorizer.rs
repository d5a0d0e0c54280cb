//! Attaching credentials to API calls and the single refresh-and-retry.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::SessionStore;

pub const LOGIN_PATH: &str = "auth/login/";
pub const REGISTER_PATH: &str = "auth/register/";
pub const REFRESH_PATH: &str = "auth/refresh/";
pub const LOGOUT_PATH: &str = "auth/logout/";

/// Obtains a new access token after the server rejected the current one.
///
/// Implementations store the new token before returning it, and end the
/// session themselves when the refresh fails.
#[async_trait]
pub trait TokenRefresher: Send + Sync + 'static {
    async fn refresh(&self) -> Result<String, ApiError>;
}

fn same_path(a: &str, b: &str) -> bool {
    a.trim_matches('/') == b.trim_matches('/')
}

/// Login and registration go out without credentials.
pub fn is_public(path: &str) -> bool {
    same_path(path, LOGIN_PATH) || same_path(path, REGISTER_PATH)
}

/// A 401 here means "credentials wrong", not "token stale".
fn retries_on_unauthorized(path: &str) -> bool {
    !is_public(path) && !same_path(path, REFRESH_PATH)
}

/// Sends API calls with the session's access token attached.
///
/// When a call comes back 401 the refresher runs once; on success the
/// call is re-sent once with the new token and that answer is final. On
/// refresh failure the call fails with [`ApiError::SessionExpired`]; the
/// refresher has already ended the session by then.
pub struct Authorizer {
    http: reqwest::Client,
    config: ClientConfig,
    session: Arc<SessionStore>,
    refresher: Arc<dyn TokenRefresher>,
}

impl Authorizer {
    pub fn new(
        http: reqwest::Client,
        config: ClientConfig,
        session: Arc<SessionStore>,
        refresher: Arc<dyn TokenRefresher>,
    ) -> Self {
        Self {
            http,
            config,
            session,
            refresher,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Send a call and return the successful response.
    ///
    /// `body` is serialised once up front so a retry sends the same bytes.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Response, ApiError> {
        let token = if is_public(path) {
            None
        } else {
            self.session.token()
        };
        let resp = self.send_once(&method, path, body.as_ref(), token).await?;

        if resp.status() != StatusCode::UNAUTHORIZED || !retries_on_unauthorized(path) {
            return ensure_success(resp).await;
        }

        debug!(%method, path, "401, refreshing access token");
        let fresh = match self.refresher.refresh().await {
            Ok(token) => token,
            Err(e) => {
                warn!(path, "token refresh failed: {}", e);
                let detail = e.detail().unwrap_or("refresh failed").to_string();
                return Err(ApiError::SessionExpired(detail));
            }
        };

        let retry = self
            .send_once(&method, path, body.as_ref(), Some(fresh))
            .await?;
        ensure_success(retry).await
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let resp = self.execute(Method::GET, path, None).await?;
        decode(resp).await
    }

    /// Send `body` as JSON with `method` and decode the JSON answer.
    pub async fn send_json<B, R>(&self, method: Method, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        let resp = self.execute(method, path, Some(body)).await?;
        decode(resp).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(Method::DELETE, path, None).await?;
        Ok(())
    }

    async fn send_once(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        token: Option<String>,
    ) -> Result<Response, ApiError> {
        let mut req = self.http.request(method.clone(), self.config.url(path));
        if let Some(token) = token {
            req = req.header(AUTHORIZATION, self.config.authorization(&token));
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        Ok(req.send().await?)
    }
}

pub(crate) async fn ensure_success(resp: Response) -> Result<Response, ApiError> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        Err(ApiError::from_response(resp).await)
    }
}

pub(crate) async fn decode<R: DeserializeOwned>(resp: Response) -> Result<R, ApiError> {
    resp.json::<R>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_paths() {
        assert!(is_public("auth/login/"));
        assert!(is_public("/auth/register"));
        assert!(!is_public("auth/logout/"));
        assert!(!is_public("products/"));
    }

    #[test]
    fn refresh_never_retries() {
        assert!(!retries_on_unauthorized("auth/refresh/"));
        assert!(!retries_on_unauthorized("auth/login/"));
        assert!(retries_on_unauthorized("products/7/"));
        assert!(retries_on_unauthorized("auth/logout/"));
    }
}
