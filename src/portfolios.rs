//! Portfolio operations.
//!
//! This module provides the PortfoliosClient for listing portfolios and
//! fetching a portfolio's assets, debts and insurance.

use crate::client::Client;
use crate::error::Result;
use crate::request::ApiRequest;
use crate::types::{PortfolioDetail, PortfolioSummary};
use serde_json::Value;

/// Client for portfolio operations.
///
/// Access via `client.portfolios()`.
pub struct PortfoliosClient {
    client: Client,
}

impl PortfoliosClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// List all portfolios.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use kubera::Client;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::from_env()?;
    ///
    ///     for (i, p) in client.portfolios().list().await?.iter().enumerate() {
    ///         println!("{}. {} ({})", i + 1, p.name, p.id);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub async fn list(&self) -> Result<Vec<PortfolioSummary>> {
        self.client.send(&ApiRequest::list_portfolios()).await
    }

    /// List all portfolios as the unwrapped JSON payload.
    pub async fn list_raw(&self) -> Result<Value> {
        self.client.execute(&ApiRequest::list_portfolios()).await
    }

    /// Get the full data of one portfolio.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use kubera::Client;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::from_env()?;
    ///
    ///     let portfolio = client.portfolios().get("portfolio-guid").await?;
    ///     println!("{} assets, {} debts", portfolio.assets.len(), portfolio.debts.len());
    ///     Ok(())
    /// }
    /// ```
    pub async fn get(&self, portfolio_id: &str) -> Result<PortfolioDetail> {
        self.client
            .send(&ApiRequest::get_portfolio(portfolio_id))
            .await
    }

    /// Get one portfolio as the unwrapped JSON payload.
    pub async fn get_raw(&self, portfolio_id: &str) -> Result<Value> {
        self.client
            .execute(&ApiRequest::get_portfolio(portfolio_id))
            .await
    }
}
