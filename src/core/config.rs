use crate::core::quote::PriceQuote;
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AssetConfig {
    /// Identifier understood by the price feed, e.g. `bitcoin`
    pub id: String,
    /// Ticker shown to users, e.g. `BTC`
    pub symbol: String,
}

fn default_primary_asset() -> AssetConfig {
    AssetConfig {
        id: "bitcoin".to_string(),
        symbol: "BTC".to_string(),
    }
}

fn default_secondary_asset() -> AssetConfig {
    AssetConfig {
        id: "ethereum".to_string(),
        symbol: "ETH".to_string(),
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CoinGeckoProviderConfig {
    pub base_url: String,
    #[serde(default = "default_primary_asset")]
    pub primary: AssetConfig,
    #[serde(default = "default_secondary_asset")]
    pub secondary: AssetConfig,
}

impl Default for CoinGeckoProviderConfig {
    fn default() -> Self {
        CoinGeckoProviderConfig {
            base_url: DEFAULT_COINGECKO_URL.to_string(),
            primary: default_primary_asset(),
            secondary: default_secondary_asset(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub coingecko: Option<CoinGeckoProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            coingecko: Some(CoinGeckoProviderConfig::default()),
        }
    }
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_fallback() -> PriceQuote {
    PriceQuote::new(67000.0, 1950.0)
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PriceCacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Served when no quote has ever been fetched successfully
    #[serde(default = "default_fallback")]
    pub fallback: PriceQuote,
}

impl PriceCacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Rejects settings the cache cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.ttl_secs == 0 {
            bail!("price_cache.ttl_secs must be greater than zero");
        }
        if self.timeout_secs == 0 {
            bail!("price_cache.timeout_secs must be greater than zero");
        }
        if !self.fallback.is_valid() {
            bail!(
                "price_cache.fallback prices must be positive, got {} and {}",
                self.fallback.primary_usd,
                self.fallback.secondary_usd
            );
        }
        Ok(())
    }
}

impl Default for PriceCacheConfig {
    fn default() -> Self {
        PriceCacheConfig {
            ttl_secs: default_ttl_secs(),
            timeout_secs: default_timeout_secs(),
            fallback: default_fallback(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub price_cache: PriceCacheConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    /// Loads the config from the default location, falling back to built-in
    /// defaults when no file has been created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "chainbazaar", "chainbazaar")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "chainbazaar", "chainbazaar")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn coingecko(&self) -> CoinGeckoProviderConfig {
        self.providers.coingecko.clone().unwrap_or_default()
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .price_cache
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
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
providers:
  coingecko:
    base_url: "http://example.com/coingecko"
price_cache:
  ttl_secs: 60
  timeout_secs: 2
  fallback:
    primary_usd: 60000.0
    secondary_usd: 2000.0
data_path: "/tmp/chainbazaar"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        let coingecko = config.coingecko();
        assert_eq!(coingecko.base_url, "http://example.com/coingecko");
        assert_eq!(coingecko.primary.id, "bitcoin");
        assert_eq!(coingecko.secondary.symbol, "ETH");
        assert_eq!(config.price_cache.ttl(), Duration::from_secs(60));
        assert_eq!(config.price_cache.timeout(), Duration::from_secs(2));
        assert_eq!(
            config.price_cache.fallback,
            PriceQuote::new(60000.0, 2000.0)
        );
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/chainbazaar")
        );
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        let coingecko = config.coingecko();
        assert_eq!(coingecko.base_url, DEFAULT_COINGECKO_URL);
        assert_eq!(config.price_cache.ttl_secs, 300);
        assert_eq!(config.price_cache.timeout_secs, 5);
        assert_eq!(
            config.price_cache.fallback,
            PriceQuote::new(67000.0, 1950.0)
        );
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_custom_assets() {
        let yaml_str = r#"
providers:
  coingecko:
    base_url: "http://localhost"
    primary:
      id: "solana"
      symbol: "SOL"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        let coingecko = config.coingecko();
        assert_eq!(
            coingecko.primary,
            AssetConfig {
                id: "solana".to_string(),
                symbol: "SOL".to_string()
            }
        );
        assert_eq!(coingecko.secondary.id, "ethereum");
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load_from_path(dir.path().join("missing.yaml"));
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }

    #[test]
    fn test_load_rejects_invalid_price_cache_settings() {
        let dir = tempfile::tempdir().unwrap();
        let cases = [
            ("price_cache:\n  ttl_secs: 0\n", "ttl_secs"),
            ("price_cache:\n  timeout_secs: 0\n", "timeout_secs"),
            (
                "price_cache:\n  fallback:\n    primary_usd: 0.0\n    secondary_usd: 1950.0\n",
                "fallback",
            ),
            (
                "price_cache:\n  fallback:\n    primary_usd: 67000.0\n    secondary_usd: -1.0\n",
                "fallback",
            ),
        ];

        for (yaml, field) in cases {
            let path = dir.path().join("config.yaml");
            fs::write(&path, yaml).unwrap();
            let err = AppConfig::load_from_path(&path).unwrap_err();
            assert!(err.to_string().contains("Invalid config file"));
            assert!(
                format!("{err:#}").contains(field),
                "expected {field} in {err:#}"
            );
        }
    }

    #[test]
    fn test_load_accepts_valid_price_cache_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "price_cache:\n  ttl_secs: 1\n  timeout_secs: 1\n").unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.price_cache.ttl(), Duration::from_secs(1));
        assert!(PriceCacheConfig::default().validate().is_ok());
    }
}
