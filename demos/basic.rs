//! Basic usage example for the Kubera client.
//!
//! This example demonstrates:
//! - Creating a client from the environment
//! - Listing portfolios
//! - Fetching one portfolio and summarising its sheets
//!
//! Run with:
//! ```bash
//! KUBERA_API_KEY=... KUBERA_SECRET=... cargo run --example basic
//! ```

use kubera::format::format_currency;
use kubera::{Category, Client};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // KUBERA_API_KEY / KUBERA_SECRET, then ~/.env
    let client = Client::from_env()?;

    println!("Fetching portfolios...");
    let portfolios = client.portfolios().list().await?;
    println!("Found {} portfolios:", portfolios.len());
    for (i, p) in portfolios.iter().enumerate() {
        println!("  {}. {} ({}, {})", i + 1, p.name, p.currency, p.id);
    }

    let Some(first) = portfolios.first() else {
        println!("\nNo portfolios to show.");
        return Ok(());
    };

    println!("\nFetching {}...", first.name);
    let detail = client.portfolios().get(&first.id).await?;

    if let Some(net_worth) = &detail.net_worth {
        println!(
            "Net worth: {}",
            format_currency(net_worth.amount(), net_worth.currency().unwrap_or(&first.currency))
        );
    }

    for category in [Category::Asset, Category::Debt, Category::Insurance] {
        let items = detail.items(category);
        let total: f64 = items.iter().map(|i| i.value_amount()).sum();
        println!(
            "  {:<10} {:>4} items  {}",
            category,
            items.len(),
            format_currency(Some(total), &first.currency)
        );
    }

    client.close();
    println!("\nDone!");
    Ok(())
}
