//! Blocking client example.
//!
//! Same calls as the async client, no runtime needed.
//!
//! Run with:
//! ```bash
//! KUBERA_API_KEY=... KUBERA_SECRET=... cargo run --example blocking
//! ```

use kubera::blocking::Client;
use kubera::KuberaError;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::from_env()?;

    let portfolios = client.portfolios().list()?;
    println!("Found {} portfolios", portfolios.len());

    if let Some(first) = portfolios.first() {
        let portfolio = client.portfolios().get(&first.id)?;
        println!("Portfolio: {}", portfolio.name.as_deref().unwrap_or(&first.name));
        println!("Assets: {}", portfolio.assets.len());
        println!("Debts: {}", portfolio.debts.len());
    }

    // Updates need a key with update permissions.
    if let Ok(item_id) = std::env::var("KUBERA_ITEM_ID") {
        let update = kubera::UpdateItemRequest {
            description: Some("Touched by the blocking example".to_string()),
            ..Default::default()
        };
        match client.items().update(&item_id, &update) {
            Ok(item) => println!("Updated {}", item.name.unwrap_or(item.id)),
            Err(KuberaError::Permission { message, .. }) => println!("{message}"),
            Err(e) => return Err(e.into()),
        }
    }

    client.close();
    Ok(())
}
