//! Client-side context management.
//!
//! Reads/writes `~/.catalog/config.toml`. The session itself lives next
//! to it in `session.redb`, one scope per server.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

fn default_scheme() -> String {
    catalog_client::config::DEFAULT_AUTH_SCHEME.to_string()
}

/// A single context, pointing at one catalog API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    /// Context name (e.g. "local").
    pub name: String,

    /// API base URL (e.g. "http://localhost:8000/api").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,

    /// Authorization scheme word, `Bearer` or `Token`.
    #[serde(default = "default_scheme")]
    pub auth_scheme: String,

    /// Request timeout in seconds; none by default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Context {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            server: String::new(),
            auth_scheme: default_scheme(),
            timeout_secs: None,
        }
    }

    /// Connection settings for the catalog client.
    pub fn client_config(&self) -> anyhow::Result<catalog_client::ClientConfig> {
        if self.server.is_empty() {
            anyhow::bail!(
                "No server URL set for context \"{}\". Run `catalog context set {} --server <url>`.",
                self.name,
                self.name
            );
        }
        let mut config =
            catalog_client::ClientConfig::new(self.server.as_str()).with_scheme(&self.auth_scheme);
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(secs);
        }
        Ok(config)
    }
}

/// Client configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Name of the currently active context.
    #[serde(rename = "current-context", default)]
    pub current_context: String,

    #[serde(default)]
    pub contexts: Vec<Context>,
}

impl CliConfig {
    /// Default config file path: ~/.catalog/config.toml.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Session database that goes with the config at `config_path`.
    pub fn session_path(config_path: &Path) -> PathBuf {
        config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(dirs_path)
            .join("session.redb")
    }

    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn current(&self) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == self.current_context)
    }

    /// The active context, or an error telling the user how to pick one.
    pub fn require_current(&self) -> anyhow::Result<&Context> {
        self.current()
            .ok_or_else(|| anyhow::anyhow!("No current context. Run `catalog use context <name>`."))
    }

    /// The named context, created empty if missing.
    pub fn entry(&mut self, name: &str) -> &mut Context {
        let idx = match self.contexts.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                self.contexts.push(Context::new(name));
                self.contexts.len() - 1
            }
        };
        &mut self.contexts[idx]
    }

    /// Remove a context by name. Returns true if it was found.
    pub fn remove_context(&mut self, name: &str) -> bool {
        let len = self.contexts.len();
        self.contexts.retain(|c| c.name != name);
        if self.current_context == name {
            self.current_context = String::new();
        }
        self.contexts.len() < len
    }
}

/// Return the catalog config directory (~/.catalog).
fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".catalog")
}
