use crate::currencies::{DEFAULT_BASE_CURRENCY, DEFAULT_TARGET_CURRENCIES};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

const DEFAULT_PROVIDER_URL: &str = "https://api.exchangerate-api.com/v4/latest";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: DEFAULT_PROVIDER_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "CacheConfig::default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "CacheConfig::default_sweep_secs")]
    pub sweep_secs: u64,
}

impl CacheConfig {
    fn default_ttl_secs() -> u64 {
        crate::cache::DEFAULT_TTL.as_secs()
    }

    fn default_sweep_secs() -> u64 {
        crate::cache::SWEEP_INTERVAL.as_secs()
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_secs: Self::default_ttl_secs(),
            sweep_secs: Self::default_sweep_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default = "AppConfig::default_base_currency")]
    pub base_currency: String,
    #[serde(default = "AppConfig::default_target_currencies")]
    pub target_currencies: Vec<String>,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            provider: ProviderConfig::default(),
            base_currency: Self::default_base_currency(),
            target_currencies: Self::default_target_currencies(),
            cache: CacheConfig::default(),
        }
    }
}

impl AppConfig {
    fn default_base_currency() -> String {
        DEFAULT_BASE_CURRENCY.to_string()
    }

    fn default_target_currencies() -> Vec<String> {
        DEFAULT_TARGET_CURRENCIES
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    /// Loads the config from the default location, falling back to built-in
    /// defaults when no file exists so the tool works out of the box.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "ratedash", "ratedash")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
provider:
  base_url: "http://example.com/latest"
base_currency: "EUR"
target_currencies: ["USD", "GBP"]
cache:
  ttl_secs: 120
  sweep_secs: 30
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.provider.base_url, "http://example.com/latest");
        assert_eq!(config.base_currency, "EUR");
        assert_eq!(config.target_currencies, vec!["USD", "GBP"]);
        assert_eq!(config.cache.ttl(), Duration::from_secs(120));
        assert_eq!(config.cache.sweep_interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_config_defaults_apply_to_missing_fields() {
        let config: AppConfig = serde_yaml::from_str("base_currency: \"GBP\"").unwrap();

        assert_eq!(config.base_currency, "GBP");
        assert_eq!(config.provider.base_url, DEFAULT_PROVIDER_URL);
        assert_eq!(config.target_currencies, AppConfig::default_target_currencies());
        assert_eq!(config.cache.ttl(), Duration::from_secs(900));
        assert_eq!(config.cache.sweep_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_default_config_matches_builtin_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.base_currency, "USD");
        assert_eq!(
            config.target_currencies,
            vec!["EUR", "GBP", "JPY", "CAD", "AUD"]
        );
    }
}
