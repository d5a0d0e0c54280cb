//! `catalog`: the product catalog CLI client.
//!
//! Manages contexts, the signed-in session, and product operations.

mod commands;
mod config;

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use catalog_bff::form::{LoginForm, RegisterForm};
use clap::{Parser, Subcommand};

use config::CliConfig;

/// Catalog CLI tool.
#[derive(Parser, Debug)]
#[command(name = "catalog", about = "Product catalog CLI client")]
struct Cli {
    /// Path to client config file (default: ~/.catalog/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage contexts (one per catalog server).
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Switch the current context.
    #[command(name = "use")]
    Use {
        #[command(subcommand)]
        what: UseWhat,
    },

    /// Login to the current context's server.
    Login {
        #[arg(long)]
        user: Option<String>,
        /// Password. Prompted for when omitted.
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account on the current context's server.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long = "first-name")]
        first_name: String,
        #[arg(long = "last-name")]
        last_name: String,
    },

    /// Logout and clear the stored session.
    Logout,

    /// Show the signed-in user.
    Whoami,

    /// Product operations.
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },

    /// Check server status.
    Status,

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum ContextAction {
    /// Create or update a context.
    Set {
        name: String,
        #[arg(long)]
        server: Option<String>,
        /// Authorization scheme: Bearer or Token.
        #[arg(long)]
        scheme: Option<String>,
        /// Request timeout in seconds (0 to disable).
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// List all contexts.
    List,
    /// Delete a context.
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
enum UseWhat {
    /// Switch to a context.
    Context { name: String },
}

#[derive(Subcommand, Debug)]
enum ProductAction {
    /// List products.
    List {
        /// Only products marked available.
        #[arg(long)]
        available: bool,
    },
    /// Show one product.
    Get { id: i64 },
    /// Create a product.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: String,
        #[arg(long)]
        available: bool,
    },
    /// Update a product (PATCH).
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        available: Option<bool>,
    },
    /// Delete a product.
    Delete {
        id: i64,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },
}

fn prompt(label: &str) -> Result<String> {
    eprint!("{}", label);
    std::io::stderr().flush()?;
    let mut s = String::new();
    std::io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .map(std::path::PathBuf::from)
        .unwrap_or_else(CliConfig::default_path);

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(run(cli, &config_path))
}

async fn run(cli: Cli, config_path: &Path) -> Result<()> {
    let json = cli.output == "json";

    match cli.command {
        Commands::Context { action } => match action {
            ContextAction::Set {
                name,
                server,
                scheme,
                timeout,
            } => {
                commands::context::set(
                    &name,
                    server.as_deref(),
                    scheme.as_deref(),
                    timeout,
                    config_path,
                )?;
            }
            ContextAction::List => commands::context::list(config_path)?,
            ContextAction::Delete { name } => commands::context::delete(&name, config_path)?,
        },

        Commands::Use { what } => match what {
            UseWhat::Context { name } => commands::context::use_context(&name, config_path)?,
        },

        Commands::Login { user, password } => {
            let client = commands::open_client(config_path)?;
            let username = match user {
                Some(u) => u,
                None => prompt("Username: ")?,
            };
            let password = match password {
                Some(p) => p,
                None => rpassword::prompt_password("Password: ")?,
            };
            commands::auth::login(&client, LoginForm::new(username, password)).await?;
        }

        Commands::Register {
            username,
            email,
            first_name,
            last_name,
        } => {
            let client = commands::open_client(config_path)?;
            let password = rpassword::prompt_password("Password: ")?;
            let confirm_password = rpassword::prompt_password("Confirm password: ")?;
            let form = RegisterForm {
                first_name,
                last_name,
                email,
                username,
                password,
                confirm_password,
            };
            commands::auth::register(&client, form).await?;
        }

        Commands::Logout => {
            let client = commands::open_client(config_path)?;
            commands::auth::logout(&client).await?;
        }

        Commands::Whoami => {
            let client = commands::open_client(config_path)?;
            commands::auth::whoami(&client)?;
        }

        Commands::Products { action } => {
            let client = commands::open_client(config_path)?;
            match action {
                ProductAction::List { available } => {
                    commands::products::list(&client, available, json).await?
                }
                ProductAction::Get { id } => commands::products::get(&client, id, json).await?,
                ProductAction::Create {
                    name,
                    price,
                    available,
                } => commands::products::create(&client, &name, &price, available, json).await?,
                ProductAction::Update {
                    id,
                    name,
                    price,
                    available,
                } => {
                    commands::products::update(
                        &client,
                        id,
                        name.as_deref(),
                        price.as_deref(),
                        available,
                        json,
                    )
                    .await?
                }
                ProductAction::Delete { id, yes } => {
                    if !yes {
                        let answer = prompt(&format!("Delete product {}? [y/N]: ", id))?;
                        if !answer.eq_ignore_ascii_case("y") {
                            println!("Cancelled.");
                            return Ok(());
                        }
                    }
                    commands::products::delete(&client, id).await?
                }
            }
        }

        Commands::Status => {
            let config = CliConfig::load(config_path)?;
            let name = config.require_current()?.name.clone();
            let client = commands::open_client(config_path)?;
            commands::products::status(&client, &name).await?;
        }

        Commands::Version => {
            println!("catalog cli v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
