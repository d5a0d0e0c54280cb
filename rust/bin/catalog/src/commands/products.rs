//! Product commands.

use anyhow::Result;
use catalog_bff::form::ProductForm;
use catalog_client::{CatalogClient, Product, ProductPatch};
use reqwest::StatusCode;

use super::{explain, rejected};

fn print_table(items: &[Product]) {
    if items.is_empty() {
        println!("No products.");
        return;
    }
    println!("{:>6}  {:40}  {:>12}  {:9}", "ID", "NAME", "PRICE", "AVAILABLE");
    for p in items {
        println!(
            "{:>6}  {:40}  {:>12}  {:9}",
            p.id,
            p.name,
            p.price.to_string(),
            if p.available { "yes" } else { "no" }
        );
    }
}

fn print_one(product: &Product, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(product)?);
        return Ok(());
    }
    println!("ID:        {}", product.id);
    println!("Name:      {}", product.name);
    println!("Price:     {}", product.price);
    println!("Available: {}", if product.available { "yes" } else { "no" });
    if let Some(at) = product.created_at {
        println!("Created:   {}", at.to_rfc3339());
    }
    if let Some(at) = product.updated_at {
        println!("Updated:   {}", at.to_rfc3339());
    }
    Ok(())
}

pub async fn list(client: &CatalogClient, available: bool, json: bool) -> Result<()> {
    let items = if available {
        client.products.list_available().await
    } else {
        client.products.list().await
    }
    .map_err(explain)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        print_table(&items);
    }
    Ok(())
}

pub async fn get(client: &CatalogClient, id: i64, json: bool) -> Result<()> {
    let product = client.products.get_by_id(id).await.map_err(explain)?;
    print_one(&product, json)
}

pub async fn create(
    client: &CatalogClient,
    name: &str,
    price: &str,
    available: bool,
    json: bool,
) -> Result<()> {
    let form = ProductForm {
        id: None,
        name: name.to_string(),
        price: price.to_string(),
        available,
    };
    let product = form.validate().map_err(rejected)?;
    let created = client.products.create(&product).await.map_err(explain)?;
    if !json {
        println!("Product {} created.", created.id);
    }
    print_one(&created, json)
}

/// Fields left out keep their current value.
pub async fn update(
    client: &CatalogClient,
    id: i64,
    name: Option<&str>,
    price: Option<&str>,
    available: Option<bool>,
    json: bool,
) -> Result<()> {
    if name.is_none() && price.is_none() && available.is_none() {
        anyhow::bail!("Nothing to update. Pass --name, --price or --available.");
    }
    let current = client.products.get_by_id(id).await.map_err(explain)?;

    let mut form = ProductForm::from_product(&current);
    if let Some(n) = name {
        form.name = n.to_string();
    }
    if let Some(p) = price {
        form.price = p.to_string();
    }
    if let Some(a) = available {
        form.available = a;
    }
    let merged = form.validate().map_err(rejected)?;

    let patch = ProductPatch {
        name: name.map(|_| merged.name.clone()),
        price: price.map(|_| merged.price),
        available,
    };
    let updated = client.products.update(id, &patch).await.map_err(explain)?;
    if !json {
        println!("Product {} updated.", updated.id);
    }
    print_one(&updated, json)
}

pub async fn delete(client: &CatalogClient, id: i64) -> Result<()> {
    client.products.delete(id).await.map_err(explain)?;
    println!("Product {} deleted.", id);
    Ok(())
}

/// Context, session and reachability of the current server.
pub async fn status(client: &CatalogClient, context: &str) -> Result<()> {
    println!("Context:   {}", context);
    println!("Server:    {}", client.config.origin());

    let signed_in = client.session.has_valid_token();
    match client.session.current_user() {
        Some(user) if signed_in => println!("Session:   {}", user.username),
        _ => println!("Session:   not logged in"),
    }

    let http = client.config.http_client().map_err(explain)?;
    match http.get(client.config.url("products/")).send().await {
        Ok(resp) if resp.status().is_success() || resp.status() == StatusCode::UNAUTHORIZED => {
            println!("Status:    connected");
        }
        Ok(resp) => println!("Status:    error ({})", resp.status()),
        Err(e) => println!("Status:    disconnected ({})", e),
    }
    Ok(())
}
