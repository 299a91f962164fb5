//! Kubera API client.
//!
//! The main async entry point. Every call is signed with a fresh timestamp and
//! its response goes through [`crate::response::handle_response`].

use crate::auth::current_timestamp;
use crate::credentials::Credentials;
use crate::error::Result;
use crate::items::ItemsClient;
use crate::portfolios::PortfoliosClient;
use crate::request::ApiRequest;
use crate::response::{decode, handle_response};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.kubera.com";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Kubera API client.
///
/// Cloning is cheap and shares the connection pool and credentials.
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
///     let portfolios = client.portfolios().list().await?;
///     for portfolio in &portfolios {
///         println!("{} ({})", portfolio.name, portfolio.currency);
///     }
///
///     client.close();
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    pub(crate) http: HttpClient,
    pub(crate) base_url: String,
    pub(crate) credentials: Arc<Credentials>,
}

/// Configuration options for the client.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Base URL for the API (default: https://api.kubera.com).
    pub base_url: Option<String>,
    /// Request timeout (default: 30 seconds).
    pub timeout: Option<Duration>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
}

impl ClientConfig {
    pub(crate) fn resolved_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub(crate) fn resolved_timeout(&self) -> Duration {
        self.timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub(crate) fn resolved_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("kubera-rust/{}", env!("CARGO_PKG_VERSION")))
    }
}

impl Client {
    /// Create a new client with default configuration.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use kubera::{Client, Credentials};
    ///
    /// let client = Client::new(Credentials::new("api_key", "secret")?)?;
    /// # Ok::<(), kubera::KuberaError>(())
    /// ```
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_config(credentials, ClientConfig::default())
    }

    /// Create a client with credentials from `KUBERA_API_KEY` /
    /// `KUBERA_SECRET`, falling back to `~/.env`.
    pub fn from_env() -> Result<Self> {
        Self::new(Credentials::from_env()?)
    }

    /// Create a new client with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use kubera::{Client, ClientConfig, Credentials};
    /// use std::time::Duration;
    ///
    /// let client = Client::with_config(
    ///     Credentials::new("api_key", "secret")?,
    ///     ClientConfig {
    ///         timeout: Some(Duration::from_secs(60)),
    ///         user_agent: Some("my-app/1.0".to_string()),
    ///         ..Default::default()
    ///     },
    /// )?;
    /// # Ok::<(), kubera::KuberaError>(())
    /// ```
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
    pub fn portfolios(&self) -> PortfoliosClient {
        PortfoliosClient::new(self.clone())
    }

    /// Asset and debt update operations.
    pub fn items(&self) -> ItemsClient {
        ItemsClient::new(self.clone())
    }

    /// Release the HTTP session.
    ///
    /// Taking `self` means this runs at most once; dropping the client has the
    /// same effect on any other exit path.
    pub fn close(self) {
        tracing::debug!(base_url = %self.base_url, "closing kubera client");
    }

    /// Sign, send and classify one request, returning the unwrapped payload.
    pub(crate) async fn execute(&self, request: &ApiRequest) -> Result<Value> {
        let headers = request.header_map(&self.credentials, current_timestamp())?;

        let mut builder = self
            .http
            .request(request.method.clone(), request.url(&self.base_url))
            .headers(headers);
        if request.has_body() {
            builder = builder.body(request.body().to_string());
        }

        tracing::debug!(method = %request.method, path = %request.path, "sending request");
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        tracing::debug!(status, path = %request.path, "received response");

        handle_response(status, &text)
    }

    pub(crate) async fn send<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        decode(self.execute(request).await?)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .finish()
    }
}
