//! Service configuration.
//!
//! Settings come from environment variables.  Plan catalogs live as
//! `.json` files in a directory, one [`PlanCatalog`] per file, and an
//! optional rate file may replace the default [`PricingConfig`].

use crate::compare::PlanCatalog;
use crate::error::PricingError;
use crate::rates::PricingConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_PLAN_DIR: &str = "plans";
pub const DEFAULT_CATALOG: &str = "standard";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: String,
    pub plan_dir: PathBuf,
    pub rate_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            plan_dir: PathBuf::from(DEFAULT_PLAN_DIR),
            rate_file: None,
        }
    }
}

impl AppConfig {
    /// Reads `PRICING_BIND_ADDR`, `PRICING_PLAN_DIR` and
    /// `PRICING_RATE_FILE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: lookup("PRICING_BIND_ADDR").unwrap_or(defaults.bind_addr),
            plan_dir: lookup("PRICING_PLAN_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.plan_dir),
            rate_file: lookup("PRICING_RATE_FILE")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
        }
    }

    /// The rate tables to price with: the rate file if one is set,
    /// otherwise the built-in defaults.
    pub fn pricing_config(&self) -> Result<PricingConfig, PricingError> {
        match &self.rate_file {
            Some(path) => {
                let config = PricingConfig::load(path)?;
                info!("Loaded rate tables from {}", path.display());
                Ok(config)
            }
            None => Ok(PricingConfig::default()),
        }
    }
}

/// Load every plan catalog in a directory, keyed by catalog name.
///
/// Files that fail to parse are logged and skipped.  A missing
/// directory yields an empty map.  When two files share a name the one
/// read last wins.
pub fn load_catalogs_from_dir(path: &Path) -> Result<HashMap<String, PlanCatalog>, PricingError> {
    let mut catalogs = HashMap::new();
    if !path.is_dir() {
        warn!("Plan directory {} not found", path.display());
        return Ok(catalogs);
    }
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let file = entry.path();
        if !entry.file_type()?.is_file() || file.extension().map_or(true, |ext| ext != "json") {
            continue;
        }
        let data = std::fs::read_to_string(&file)?;
        match serde_json::from_str::<PlanCatalog>(&data) {
            Ok(catalog) => {
                info!("Loaded plan catalog {:?} from {}", catalog.name, file.display());
                catalogs.insert(catalog.name.clone(), catalog);
            }
            Err(err) => warn!("Failed to parse plan catalog {}: {}", file.display(), err),
        }
    }
    Ok(catalogs)
}
