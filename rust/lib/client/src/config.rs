use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_AUTH_SCHEME: &str = "Bearer";

/// Where the API lives and how requests are authorised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    /// Authorization scheme word, `Bearer` or `Token`.
    #[serde(default = "default_scheme")]
    pub auth_scheme: String,
    /// Per-request timeout. No local timeout when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_scheme() -> String {
    DEFAULT_AUTH_SCHEME.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_scheme: default_scheme(),
            timeout_secs: None,
        }
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.auth_scheme = scheme.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Absolute URL for an API path such as `products/42/`.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Storage scope for session keys: one scope per API origin.
    pub fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self, token: &str) -> String {
        format!("{} {}", self.auth_scheme, token)
    }

    pub fn http_client(&self) -> Result<reqwest::Client, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder
            .build()
            .map_err(|e| ApiError::NetworkUnreachable(e.to_string()))
    }
}
