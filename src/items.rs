//! Item update operations.
//!
//! Updates need an API key with update permissions enabled; read-only keys
//! get [`crate::KuberaError::Permission`].

use crate::client::Client;
use crate::error::Result;
use crate::request::ApiRequest;
use crate::types::{Item, UpdateItemRequest};
use serde_json::Value;

/// Client for asset and debt updates.
///
/// Access via `client.items()`.
pub struct ItemsClient {
    client: Client,
}

impl ItemsClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Update fields of an asset or debt.
    ///
    /// Only the fields set in `updates` are sent. An empty update fails with
    /// [`crate::KuberaError::InvalidRequest`] without contacting the server.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use kubera::{Client, UpdateItemRequest};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::from_env()?;
    ///
    ///     let item = client.items().update("item-id", &UpdateItemRequest {
    ///         value: Some(50000.0),
    ///         ..Default::default()
    ///     }).await?;
    ///     println!("Updated {}", item.name.unwrap_or_default());
    ///     Ok(())
    /// }
    /// ```
    pub async fn update(&self, item_id: &str, updates: &UpdateItemRequest) -> Result<Item> {
        self.client
            .send(&ApiRequest::update_item(item_id, updates)?)
            .await
    }

    /// Update an item and return the unwrapped JSON payload.
    pub async fn update_raw(&self, item_id: &str, updates: &UpdateItemRequest) -> Result<Value> {
        self.client
            .execute(&ApiRequest::update_item(item_id, updates)?)
            .await
    }
}
