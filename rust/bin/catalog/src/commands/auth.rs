//! Login / register / logout / whoami.

use anyhow::Result;
use catalog_bff::form::{LoginForm, RegisterForm};
use catalog_client::CatalogClient;

use super::{explain, rejected};

pub async fn login(client: &CatalogClient, form: LoginForm) -> Result<()> {
    form.validate().map_err(rejected)?;
    let user = client
        .auth
        .login(form.username.trim(), &form.password)
        .await
        .map_err(explain)?;
    println!("Logged in as {} ({}).", user.username, user.display_name());
    println!("Server: {}", client.config.origin());
    Ok(())
}

pub async fn register(client: &CatalogClient, form: RegisterForm) -> Result<()> {
    let request = form.validate().map_err(rejected)?;
    client.auth.register(&request).await.map_err(explain)?;
    println!("Account \"{}\" created. Run `catalog login` to sign in.", request.username);
    Ok(())
}

/// Always signs out locally.
pub async fn logout(client: &CatalogClient) -> Result<()> {
    if client.session.token().is_none() {
        println!("Not logged in.");
        return Ok(());
    }
    client.auth.logout().await.map_err(explain)?;
    println!("Logged out from {}.", client.config.origin());
    Ok(())
}

pub fn whoami(client: &CatalogClient) -> Result<()> {
    if !client.session.has_valid_token() {
        println!("Not logged in.");
        return Ok(());
    }
    match client.session.current_user() {
        Some(user) => {
            println!("{} [{}]", user.display_name(), user.initials());
            println!("  username: {}", user.username);
            if !user.email.is_empty() {
                println!("  email:    {}", user.email);
            }
        }
        None => println!("Logged in (no profile stored)."),
    }
    Ok(())
}
