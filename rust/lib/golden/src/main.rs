//! Reference catalog backend.
//!
//! Usage: catalogd [--listen 127.0.0.1:8000] [--access-ttl 300]

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use catalog_golden::server::{self, Backend, JwtService};

#[derive(Parser)]
#[command(name = "catalogd", about = "Reference product catalog backend")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8000")]
    listen: String,

    /// Access token lifetime, in seconds.
    #[arg(long, default_value_t = 300)]
    access_ttl: i64,

    /// Refresh token lifetime, in seconds.
    #[arg(long, default_value_t = 86400)]
    refresh_ttl: i64,

    /// HMAC secret for signing tokens.
    #[arg(long, default_value = server::jwt::DEV_SECRET)]
    secret: String,

    /// Start with an empty catalog.
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let jwt = JwtService::new(&args.secret, args.access_ttl, args.refresh_ttl);
    let backend = Arc::new(Backend::in_memory(jwt));
    backend.add_user("alice", "secret", "alice@example.com", "Alice", "Liddell")?;
    if !args.no_seed {
        backend.seed_samples()?;
    }

    let app = server::router(backend);

    info!("Catalog API listening on http://{}/api", args.listen);
    info!("Login: alice / secret");

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
