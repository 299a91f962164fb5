//! Blocking Kubera client.
//!
//! Same operations as [`crate::Client`], executed on the caller's thread. Both
//! clients sign with [`ApiRequest`] and classify with
//! [`crate::response::handle_response`], so they behave identically.
//!
//! Do not use this client from inside an async runtime.

use crate::auth::current_timestamp;
use crate::client::ClientConfig;
use crate::credentials::Credentials;
use crate::error::Result;
use crate::request::ApiRequest;
use crate::response::{decode, handle_response};
use crate::types::{Item, PortfolioDetail, PortfolioSummary, UpdateItemRequest};
use reqwest::blocking::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Blocking Kubera API client.
///
/// # Example
///
/// ```rust,no_run
/// use kubera::blocking::Client;
///
/// let client = Client::from_env()?;
/// let portfolios = client.portfolios().list()?;
/// println!("Found {} portfolios", portfolios.len());
/// client.close();
/// # Ok::<(), kubera::KuberaError>(())
/// ```
#[derive(Clone)]
pub struct Client {
    http: HttpClient,
    base_url: String,
    credentials: Arc<Credentials>,
}

impl Client {
    /// Create a new blocking client with default configuration.
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    /// Create a blocking client with credentials from the environment or
    /// `~/.env`.
    pub fn from_env() -> Result<Self> {
        Self::new(Credentials::from_env()?)
    }

    /// Create a new blocking client with custom configuration.
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.resolved_timeout())
            .user_agent(config.resolved_user_agent())
            .build()?;

        Ok(Self {
            http,
            base_url: config.resolved_base_url(),
            credentials: Arc::new(credentials),
        })
    }

    /// Get the base URL for the API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Portfolio list and detail operations.
    pub fn portfolios(&self) -> PortfoliosClient<'_> {
        PortfoliosClient { client: self }
    }

    /// Asset and debt update operations.
    pub fn items(&self) -> ItemsClient<'_> {
        ItemsClient { client: self }
    }

    /// Release the HTTP session. Dropping the client does the same.
    pub fn close(self) {
        tracing::debug!(base_url = %self.base_url, "closing blocking kubera client");
    }

    fn execute(&self, request: &ApiRequest) -> Result<Value> {
        let headers = request.header_map(&self.credentials, current_timestamp())?;

        let mut builder = self
            .http
            .request(request.method.clone(), request.url(&self.base_url))
            .headers(headers);
        if request.has_body() {
            builder = builder.body(request.body().to_string());
        }

        tracing::debug!(method = %request.method, path = %request.path, "sending request");
        let response = builder.send()?;
        let status = response.status().as_u16();
        let text = response.text()?;
        tracing::debug!(status, path = %request.path, "received response");

        handle_response(status, &text)
    }

    fn send<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        decode(self.execute(request)?)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("blocking::Client")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish()
    }
}

/// Blocking portfolio operations. Access via `client.portfolios()`.
pub struct PortfoliosClient<'a> {
    client: &'a Client,
}

impl PortfoliosClient<'_> {
    /// List all portfolios.
    pub fn list(&self) -> Result<Vec<PortfolioSummary>> {
        self.client.send(&ApiRequest::list_portfolios())
    }

    /// List all portfolios as the unwrapped JSON payload.
    pub fn list_raw(&self) -> Result<Value> {
        self.client.execute(&ApiRequest::list_portfolios())
    }

    /// Get the full data of one portfolio.
    pub fn get(&self, portfolio_id: &str) -> Result<PortfolioDetail> {
        self.client.send(&ApiRequest::get_portfolio(portfolio_id))
    }

    /// Get one portfolio as the unwrapped JSON payload.
    pub fn get_raw(&self, portfolio_id: &str) -> Result<Value> {
        self.client.execute(&ApiRequest::get_portfolio(portfolio_id))
    }
}

/// Blocking item updates. Access via `client.items()`.
pub struct ItemsClient<'a> {
    client: &'a Client,
}

impl ItemsClient<'_> {
    /// Update fields of an asset or debt.
    pub fn update(&self, item_id: &str, updates: &UpdateItemRequest) -> Result<Item> {
        self.client.send(&ApiRequest::update_item(item_id, updates)?)
    }

    /// Update an item and return the unwrapped JSON payload.
    pub fn update_raw(&self, item_id: &str, updates: &UpdateItemRequest) -> Result<Value> {
        self.client
            .execute(&ApiRequest::update_item(item_id, updates)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocking_client_new() {
        let client = Client::new(Credentials::new("test_key", "test_secret").unwrap()).unwrap();
        assert_eq!(client.base_url(), "https://api.kubera.com");
        client.close();
    }

    #[test]
    fn test_blocking_client_with_config() {
        let client = Client::with_config(
            Credentials::new("test_key", "test_secret").unwrap(),
            ClientConfig {
                base_url: Some("http://localhost:8080".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }
}
