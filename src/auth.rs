//! HMAC-SHA256 request signing for the Kubera API.
//!
//! The signing string is `api_key + timestamp + METHOD + path + body` with no
//! separators. `body` must be the exact compact JSON that goes on the wire, or
//! the empty string for requests without one.

use crate::credentials::Credentials;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the API key.
pub const API_TOKEN_HEADER: &str = "x-api-token";
/// Header carrying the signing timestamp (seconds since epoch).
pub const TIMESTAMP_HEADER: &str = "x-timestamp";
/// Header carrying the hex-encoded HMAC signature.
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Compute the lower-case hex HMAC-SHA256 signature for one request.
pub fn generate_signature(
    api_key: &str,
    secret: &str,
    method: &str,
    path: &str,
    body: &str,
    timestamp: u64,
) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");

    mac.update(api_key.as_bytes());
    mac.update(timestamp.to_string().as_bytes());
    mac.update(method.as_bytes());
    mac.update(path.as_bytes());
    mac.update(body.as_bytes());

    hex::encode(mac.finalize().into_bytes())
}

/// Current Unix time in whole seconds.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// The inputs of one signature. Built per call and never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest<'a> {
    /// Upper-case HTTP method.
    pub method: &'a str,
    /// Request path, including the query string if any.
    pub path: &'a str,
    /// Compact JSON body, or empty.
    pub body: &'a str,
    /// Seconds since epoch.
    pub timestamp: u64,
}

impl<'a> SignedRequest<'a> {
    pub fn new(method: &'a str, path: &'a str, body: &'a str, timestamp: u64) -> Self {
        Self {
            method,
            path,
            body,
            timestamp,
        }
    }

    /// Sign this request with the given credentials.
    pub fn sign(&self, credentials: &Credentials) -> AuthHeaders {
        let signature = generate_signature(
            credentials.api_key(),
            credentials.expose_secret(),
            self.method,
            self.path,
            self.body,
            self.timestamp,
        );

        AuthHeaders {
            token: credentials.api_key().to_string(),
            timestamp: self.timestamp.to_string(),
            signature,
        }
    }
}

/// The three authentication header values for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    pub token: String,
    pub timestamp: String,
    pub signature: String,
}

impl AuthHeaders {
    /// `(header name, value)` pairs in a fixed order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            (API_TOKEN_HEADER, self.token.as_str()),
            (TIMESTAMP_HEADER, self.timestamp.as_str()),
            (SIGNATURE_HEADER, self.signature.as_str()),
        ]
        .into_iter()
    }
}
