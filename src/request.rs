//! Transport-agnostic description of each API call.
//!
//! The async and blocking clients build the same [`ApiRequest`] and sign it
//! the same way, so both surfaces put identical bytes and headers on the
//! wire.

use crate::auth::{AuthHeaders, SignedRequest};
use crate::credentials::Credentials;
use crate::error::{KuberaError, Result};
use crate::types::UpdateItemRequest;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;

/// API path prefix for data endpoints.
pub const API_PREFIX: &str = "/api/v3/data";

/// One call: method, path and the compact JSON body, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    body: Option<String>,
}

impl ApiRequest {
    /// A request without a body.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    /// A POST request. The body is serialized once, compactly; that exact
    /// string is both signed and sent.
    pub fn post<B: Serialize>(path: impl Into<String>, body: &B) -> Result<Self> {
        let body = serde_json::to_string(body)
            .map_err(|e| KuberaError::InvalidRequest(format!("unserializable body: {e}")))?;

        Ok(Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body),
        })
    }

    /// `GET /api/v3/data/portfolio`
    pub fn list_portfolios() -> Self {
        Self::get(format!("{API_PREFIX}/portfolio"))
    }

    /// `GET /api/v3/data/portfolio/{id}`
    pub fn get_portfolio(portfolio_id: &str) -> Self {
        Self::get(format!("{API_PREFIX}/portfolio/{portfolio_id}"))
    }

    /// `POST /api/v3/data/item/{id}`
    ///
    /// Rejects an update with no fields set before any I/O happens.
    pub fn update_item(item_id: &str, updates: &UpdateItemRequest) -> Result<Self> {
        if updates.is_empty() {
            return Err(KuberaError::InvalidRequest(
                "No updates specified. Use name, description, value, or cost".to_string(),
            ));
        }
        Self::post(format!("{API_PREFIX}/item/{item_id}"), updates)
    }

    /// The body string that is signed and sent; empty for bodiless requests.
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Authentication headers for this request at `timestamp`.
    pub fn authorize(&self, credentials: &Credentials, timestamp: u64) -> AuthHeaders {
        SignedRequest::new(self.method.as_str(), &self.path, self.body(), timestamp)
            .sign(credentials)
    }

    /// Full header set for sending: content type plus the three auth headers.
    pub(crate) fn header_map(
        &self,
        credentials: &Credentials,
        timestamp: u64,
    ) -> Result<HeaderMap> {
        let auth = self.authorize(credentials, timestamp);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in auth.iter() {
            let value = HeaderValue::from_str(value).map_err(|_| {
                KuberaError::InvalidRequest(format!("{name} is not a valid header value"))
            })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    pub(crate) fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path)
    }
}
