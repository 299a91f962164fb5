//! Concurrent requests with the async Kubera client.
//!
//! Fetches every portfolio at once from a single shared client. Each request
//! is signed with its own timestamp.
//!
//! Keep the rate limits in mind: 30 requests per minute, and a daily cap that
//! depends on the plan.
//!
//! Run with:
//! ```bash
//! KUBERA_API_KEY=... KUBERA_SECRET=... cargo run --example concurrent
//! ```

use kubera::{Client, KuberaError};
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::from_env()?;
    let portfolios = client.portfolios().list().await?;

    println!("Fetching {} portfolios concurrently...", portfolios.len());
    let start = Instant::now();

    let mut tasks = Vec::with_capacity(portfolios.len());
    for portfolio in &portfolios {
        let client = client.clone();
        let id = portfolio.id.clone();
        tasks.push(tokio::spawn(async move { client.portfolios().get(&id).await }));
    }

    for (portfolio, task) in portfolios.iter().zip(tasks) {
        match task.await? {
            Ok(detail) => println!(
                "  {}: {} assets, {} debts, {} insurance",
                portfolio.name,
                detail.assets.len(),
                detail.debts.len(),
                detail.insurance.len()
            ),
            Err(e @ KuberaError::RateLimit { .. }) => {
                println!("  {}: rate limited ({})", portfolio.name, e.message())
            }
            Err(e) => println!("  {}: failed: {}", portfolio.name, e),
        }
    }

    println!("Completed in {:?}", start.elapsed());
    Ok(())
}
