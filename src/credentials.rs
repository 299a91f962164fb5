//! API credentials and where to find them.
//!
//! Resolution is an explicit, ordered list of [`CredentialSource`]s. The
//! first source that holds a value wins, independently for the API key and
//! the secret. Nothing here mutates the process environment.

use crate::error::{KuberaError, Result};
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable holding the API key.
pub const API_KEY_VAR: &str = "KUBERA_API_KEY";
/// Environment variable holding the API secret.
pub const SECRET_VAR: &str = "KUBERA_SECRET";

/// An API key and its secret.
///
/// The secret is wrapped in `SecretString` so it never shows up in `Debug`
/// output and is zeroed on drop.
pub struct Credentials {
    api_key: String,
    secret: SecretString,
}

impl Credentials {
    /// Create credentials from explicit values.
    ///
    /// Empty values are rejected with [`KuberaError::MissingCredentials`].
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        let secret = secret.into();
        if api_key.is_empty() || secret.is_empty() {
            return Err(KuberaError::MissingCredentials);
        }

        Ok(Self {
            api_key,
            secret: SecretString::from(secret),
        })
    }

    /// Resolve credentials from the process environment, then `~/.env`.
    pub fn from_env() -> Result<Self> {
        resolve_credentials(&default_sources(None, None))
    }

    /// The API key (sent in clear as `x-api-token`).
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Expose the secret for signing. Never log the return value.
    pub fn expose_secret(&self) -> &str {
        self.secret.expose_secret()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// One place credentials may come from.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Values passed by the caller, e.g. CLI flags.
    Explicit {
        api_key: Option<String>,
        secret: Option<String>,
    },
    /// A snapshot of environment variables.
    Environment(HashMap<String, String>),
    /// A dotenv-style file (`KEY=value` or `export KEY=value`).
    EnvFile(PathBuf),
}

impl CredentialSource {
    /// Snapshot the Kubera variables from the process environment.
    pub fn process_env() -> Self {
        let vars = [API_KEY_VAR, SECRET_VAR]
            .into_iter()
            .filter_map(|name| std::env::var(name).ok().map(|v| (name.to_string(), v)))
            .collect();
        Self::Environment(vars)
    }

    /// `~/.env`, if a home directory is known.
    pub fn home_env_file() -> Option<Self> {
        dirs::home_dir().map(|home| Self::EnvFile(home.join(".env")))
    }

    fn lookup(&self) -> (Option<String>, Option<String>) {
        match self {
            Self::Explicit { api_key, secret } => (api_key.clone(), secret.clone()),
            Self::Environment(vars) => (
                vars.get(API_KEY_VAR).cloned(),
                vars.get(SECRET_VAR).cloned(),
            ),
            Self::EnvFile(path) => {
                let mut vars = read_env_file(path);
                (vars.remove(API_KEY_VAR), vars.remove(SECRET_VAR))
            }
        }
    }
}

/// Explicit values, then the process environment, then `~/.env`.
pub fn default_sources(api_key: Option<String>, secret: Option<String>) -> Vec<CredentialSource> {
    let mut sources = vec![
        CredentialSource::Explicit { api_key, secret },
        CredentialSource::process_env(),
    ];
    sources.extend(CredentialSource::home_env_file());
    sources
}

/// Walk `sources` in order and build credentials from the first populated
/// value of each field. Later sources are only read while a field is missing.
pub fn resolve_credentials(sources: &[CredentialSource]) -> Result<Credentials> {
    let mut api_key: Option<String> = None;
    let mut secret: Option<String> = None;

    for source in sources {
        if api_key.is_some() && secret.is_some() {
            break;
        }
        let (found_key, found_secret) = source.lookup();
        api_key = api_key.or(found_key.filter(|v| !v.is_empty()));
        secret = secret.or(found_secret.filter(|v| !v.is_empty()));
    }

    match (api_key, secret) {
        (Some(api_key), Some(secret)) => Credentials::new(api_key, secret),
        _ => Err(KuberaError::MissingCredentials),
    }
}

/// Parse a dotenv file into a map. A missing file yields an empty map.
fn read_env_file(path: &Path) -> HashMap<String, String> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) if e.not_found() => return HashMap::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable env file");
            return HashMap::new();
        }
    };

    iter.filter_map(|item| match item {
        Ok(pair) => Some(pair),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "skipping malformed env file line");
            None
        }
    })
    .collect()
}
