//! # Kubera Rust Client
//!
//! Rust client and command-line interface for the Kubera Data API v3.
//!
//! Every request is signed with HMAC-SHA256 over the API key, a fresh
//! timestamp, the method, the path and the exact JSON body that is sent.
//! Responses are unwrapped from the `{"data": ...}` envelope or mapped to a
//! typed [`KuberaError`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kubera::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // KUBERA_API_KEY / KUBERA_SECRET, falling back to ~/.env
//!     let client = Client::from_env()?;
//!
//!     let portfolios = client.portfolios().list().await?;
//!     let first = &portfolios[0];
//!
//!     let detail = client.portfolios().get(&first.id).await?;
//!     println!("{}: {} assets", first.name, detail.assets.len());
//!
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Blocking Client
//!
//! With the `blocking` feature (on by default) the same operations are
//! available without an async runtime:
//!
//! ```rust,no_run
//! # #[cfg(feature = "blocking")]
//! # fn main() -> kubera::Result<()> {
//! let client = kubera::blocking::Client::from_env()?;
//! let portfolios = client.portfolios().list()?;
//! println!("Found {} portfolios", portfolios.len());
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "blocking"))]
//! # fn main() {}
//! ```
//!
//! ## Updating Items
//!
//! Updates require an API key with update permissions enabled:
//!
//! ```rust,no_run
//! use kubera::{Client, UpdateItemRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::from_env()?;
//!     let item = client.items().update("item-id", &UpdateItemRequest {
//!         value: Some(50000.0),
//!         cost: Some(45000.0),
//!         ..Default::default()
//!     }).await?;
//!     println!("{:?}", item.value);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, KuberaError>`:
//!
//! ```rust,no_run
//! use kubera::{Client, KuberaError};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Client::from_env().expect("credentials");
//!
//!     match client.portfolios().list().await {
//!         Ok(portfolios) => println!("Found {} portfolios", portfolios.len()),
//!         Err(KuberaError::Authentication { .. }) => println!("Check your API key and secret"),
//!         Err(KuberaError::RateLimit { .. }) => println!("Rate limited, retry later"),
//!         Err(e) => println!("Error: {}", e),
//!     }
//! }
//! ```

pub mod auth;
#[cfg(feature = "blocking")]
pub mod blocking;
pub mod cache;
pub mod cli;
pub mod client;
pub mod credentials;
pub mod error;
pub mod format;
pub mod items;
pub mod portfolios;
pub mod request;
pub mod response;
pub mod types;

// Re-export main types at the crate root
pub use client::{Client, ClientConfig};
pub use credentials::Credentials;
pub use error::{KuberaError, Result};

pub use types::{
    Category, Item, Money, NetWorth, PortfolioDetail, PortfolioSummary, UpdateItemRequest,
};
