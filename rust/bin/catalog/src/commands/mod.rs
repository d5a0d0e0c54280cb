pub mod auth;
pub mod context;
pub mod products;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use catalog_bff::form::FieldErrors;
use catalog_client::{ApiError, CatalogClient};
use catalog_flux::StateStore;
use catalog_kv::{KVStore, RedbStore};
use tracing::debug;

use crate::config::CliConfig;

/// Client for the current context, with the session from `session.redb`.
pub fn open_client(config_path: &Path) -> Result<CatalogClient> {
    let config = CliConfig::load(config_path)?;
    let client_config = config.require_current()?.client_config()?;
    let session_path = CliConfig::session_path(config_path);
    debug!(server = %client_config.origin(), session = %session_path.display(), "opening client");
    let kv: Arc<dyn KVStore> = Arc::new(RedbStore::open(&session_path)?);
    Ok(CatalogClient::new(client_config, kv, Arc::new(StateStore::new()))?)
}

/// Turn a failed call into a message for the terminal.
pub fn explain(err: ApiError) -> anyhow::Error {
    let mut text = match err.detail() {
        Some(detail) => format!("{}: {}", err, detail),
        None => err.to_string(),
    };
    if let Some(fields) = err.field_errors() {
        for (field, messages) in fields {
            text.push_str(&format!("\n  {}: {}", field, messages.join(" ")));
        }
    }
    if err.is_session_ending() {
        text.push_str("\nRun `catalog login` to sign in again.");
    }
    anyhow::anyhow!(text)
}

/// Local form errors, one field per line.
pub fn rejected(errors: FieldErrors) -> anyhow::Error {
    let lines: Vec<String> = errors
        .iter()
        .map(|(field, message)| format!("  {}: {}", field, message))
        .collect();
    anyhow::anyhow!("invalid input\n{}", lines.join("\n"))
}
