//! Context management commands.

use std::path::Path;

use anyhow::Result;

use crate::config::CliConfig;

/// Create or update a context. The first context becomes current.
pub fn set(
    name: &str,
    server: Option<&str>,
    scheme: Option<&str>,
    timeout: Option<u64>,
    config_path: &Path,
) -> Result<()> {
    let mut config = CliConfig::load(config_path)?;
    let existed = config.contexts.iter().any(|c| c.name == name);

    let ctx = config.entry(name);
    if let Some(s) = server {
        ctx.server = s.trim_end_matches('/').to_string();
    }
    if let Some(s) = scheme {
        if s != "Bearer" && s != "Token" {
            anyhow::bail!("Unknown auth scheme \"{}\" (expected Bearer or Token).", s);
        }
        ctx.auth_scheme = s.to_string();
    }
    if let Some(t) = timeout {
        ctx.timeout_secs = (t > 0).then_some(t);
    }
    if config.current_context.is_empty() {
        config.current_context = name.to_string();
    }

    config.save(config_path)?;
    if existed {
        println!("Context \"{}\" updated.", name);
    } else {
        println!("Context \"{}\" created.", name);
    }
    Ok(())
}

pub fn list(config_path: &Path) -> Result<()> {
    let config = CliConfig::load(config_path)?;

    if config.contexts.is_empty() {
        println!("No contexts configured.");
        println!("Run: catalog context set <name> --server <url>");
        return Ok(());
    }

    println!("{:2} {:20} {:40} {:8}", "", "NAME", "SERVER", "SCHEME");
    for ctx in &config.contexts {
        let marker = if ctx.name == config.current_context {
            "*"
        } else {
            " "
        };
        let server = if ctx.server.is_empty() { "-" } else { &ctx.server };
        println!("{:2} {:20} {:40} {:8}", marker, ctx.name, server, ctx.auth_scheme);
    }
    Ok(())
}

/// Switch current context.
pub fn use_context(name: &str, config_path: &Path) -> Result<()> {
    let mut config = CliConfig::load(config_path)?;

    if !config.contexts.iter().any(|c| c.name == name) {
        anyhow::bail!(
            "Context \"{}\" not found. Run `catalog context list` to see available contexts.",
            name
        );
    }

    config.current_context = name.to_string();
    config.save(config_path)?;
    println!("Switched to context \"{}\".", name);
    Ok(())
}

/// Delete a context. Its stored session stays until the next logout.
pub fn delete(name: &str, config_path: &Path) -> Result<()> {
    let mut config = CliConfig::load(config_path)?;

    if !config.remove_context(name) {
        anyhow::bail!("Context \"{}\" not found.", name);
    }

    config.save(config_path)?;
    println!("Context \"{}\" deleted.", name);
    Ok(())
}
