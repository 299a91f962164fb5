//! Local index cache for portfolio GUIDs.
//!
//! `kubera list` writes the portfolios it saw to
//! `~/.kubera/portfolio_cache.json` so later commands accept `1`, `2`, ...
//! in place of a GUID.

use crate::error::{KuberaError, Result};
use crate::types::PortfolioSummary;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const GUID_LEN: usize = 36;

/// One cached portfolio entry.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CachedPortfolio {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct CacheFile {
    #[serde(default)]
    portfolios: Vec<CachedPortfolio>,
}

/// Index-to-GUID cache backed by a JSON file.
#[derive(Debug, Clone)]
pub struct PortfolioCache {
    path: PathBuf,
}

impl PortfolioCache {
    /// Cache at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Cache at `~/.kubera/portfolio_cache.json`.
    pub fn default_location() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| KuberaError::Cache("could not determine home directory".to_string()))?;
        Ok(Self::new(home.join(".kubera").join("portfolio_cache.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the cached list, in the order given.
    pub fn save(&self, portfolios: &[PortfolioSummary]) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| cache_error(&self.path, e))?;
        }

        let file = CacheFile {
            portfolios: portfolios
                .iter()
                .map(|p| CachedPortfolio {
                    id: p.id.clone(),
                    name: Some(p.name.clone()),
                    currency: Some(p.currency.clone()),
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| cache_error(&self.path, e))?;
        std::fs::write(&self.path, json).map_err(|e| cache_error(&self.path, e))
    }

    /// Cached portfolios. Missing or unreadable caches read as empty.
    pub fn load(&self) -> Vec<CachedPortfolio> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(_) => return Vec::new(),
        };

        match serde_json::from_str::<CacheFile>(&contents) {
            Ok(file) => file.portfolios,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "ignoring corrupt portfolio cache"
                );
                Vec::new()
            }
        }
    }

    /// Turn a GUID or a 1-based index from the last `list` into a GUID.
    ///
    /// Any 36-character input containing a hyphen is taken as a GUID without
    /// further validation.
    pub fn resolve(&self, id_or_index: &str) -> Option<String> {
        let input = id_or_index.trim();
        if input.len() == GUID_LEN && input.contains('-') {
            return Some(input.to_string());
        }

        let index: usize = input.parse().ok()?;
        let portfolios = self.load();
        index
            .checked_sub(1)
            .and_then(|i| portfolios.get(i))
            .map(|p| p.id.clone())
    }
}

fn cache_error(path: &Path, e: impl std::fmt::Display) -> KuberaError {
    KuberaError::Cache(format!("{}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use uuid::Uuid;

    fn temp_cache() -> PortfolioCache {
        let dir = std::env::temp_dir().join(format!("kubera-cache-{}", Uuid::new_v4()));
        PortfolioCache::new(dir.join("portfolio_cache.json"))
    }

    fn summary(id: &str, name: &str) -> PortfolioSummary {
        PortfolioSummary {
            id: id.to_string(),
            name: name.to_string(),
            currency: "USD".to_string(),
            extra: Map::new(),
        }
    }

    #[test]
    fn test_save_then_resolve_index() {
        let cache = temp_cache();
        cache
            .save(&[summary("portfolio_001", "First"), summary("portfolio_002", "Second")])
            .unwrap();

        assert_eq!(cache.resolve("1").as_deref(), Some("portfolio_001"));
        assert_eq!(cache.resolve("2").as_deref(), Some("portfolio_002"));
        assert_eq!(cache.resolve("3"), None);
        assert_eq!(cache.resolve("0"), None);

        let loaded = cache.load();
        assert_eq!(loaded[1].name.as_deref(), Some("Second"));
        std::fs::remove_dir_all(cache.path().parent().unwrap()).unwrap();
    }

    #[test]
    fn test_guid_passes_through_without_cache() {
        let cache = temp_cache();
        let guid = "3f2504e0-4f89-11d3-9a0c-0305e82c3301";
        assert_eq!(cache.resolve(guid).as_deref(), Some(guid));
    }

    #[test]
    fn test_guid_shape_decides_passthrough() {
        let cache = temp_cache();
        cache.save(&[summary("portfolio_001", "First")]).unwrap();

        let loose = "abcdefgh-ijkl-mnop-qrst-uvwxyz123456";
        assert_eq!(cache.resolve(loose).as_deref(), Some(loose));
        assert_eq!(cache.resolve("3f2504e04f8911d39a0c0305e82c3301"), None);
        assert_eq!(cache.resolve("short-id"), None);
        std::fs::remove_dir_all(cache.path().parent().unwrap()).unwrap();
    }

    #[test]
    fn test_missing_cache_is_empty() {
        let cache = temp_cache();
        assert!(cache.load().is_empty());
        assert_eq!(cache.resolve("1"), None);
        assert_eq!(cache.resolve("not-a-guid"), None);
    }

    #[test]
    fn test_corrupt_cache_is_empty() {
        let cache = temp_cache();
        std::fs::create_dir_all(cache.path().parent().unwrap()).unwrap();
        std::fs::write(cache.path(), "{not json").unwrap();

        assert!(cache.load().is_empty());
        std::fs::remove_dir_all(cache.path().parent().unwrap()).unwrap();
    }

    #[test]
    fn test_cache_file_shape() {
        let cache = temp_cache();
        cache.save(&[summary("portfolio_001", "First")]).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(cache.path()).unwrap()).unwrap();
        assert_eq!(raw["portfolios"][0]["id"], "portfolio_001");
        assert_eq!(raw["portfolios"][0]["currency"], "USD");
        std::fs::remove_dir_all(cache.path().parent().unwrap()).unwrap();
    }
}
