use crate::core::currency::{BASE_CURRENCY, Currency};
use crate::providers::{bucket, korea_exim};
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BucketSourceConfig {
    pub url: String,
}

#[derive(Deserialize, Serialize, Clone, PartialEq)]
pub struct KoreaEximSourceConfig {
    #[serde(default = "default_korea_exim_url")]
    pub base_url: String,
    pub auth_key: String,
}

impl fmt::Debug for KoreaEximSourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KoreaEximSourceConfig")
            .field("base_url", &self.base_url)
            .field("auth_key", &"<redacted>")
            .finish()
    }
}

fn default_korea_exim_url() -> String {
    korea_exim::DEFAULT_BASE_URL.to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SourceConfig {
    pub bucket: Option<BucketSourceConfig>,
    pub korea_exim: Option<KoreaEximSourceConfig>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            bucket: Some(BucketSourceConfig {
                url: bucket::DEFAULT_BUCKET_URL.to_string(),
            }),
            korea_exim: None,
        }
    }
}

fn default_from() -> String {
    BASE_CURRENCY.to_string()
}

fn default_to() -> String {
    "USD".to_string()
}

fn default_display_precision() -> usize {
    2
}

fn default_refresh_interval_secs() -> u64 {
    300
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default = "default_from")]
    pub default_from: String,
    #[serde(default = "default_to")]
    pub default_to: String,
    /// Maximum fraction digits shown for converted amounts.
    #[serde(default = "default_display_precision")]
    pub display_precision: usize,
    /// Rates older than this are flagged as stale.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    pub data_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            source: SourceConfig::default(),
            default_from: default_from(),
            default_to: default_to(),
            display_precision: default_display_precision(),
            refresh_interval_secs: default_refresh_interval_secs(),
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the config at the default location, or the defaults if there is
    /// no file there yet.
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
        let proj_dirs = ProjectDirs::from("dev", "ratepad", "ratepad")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "ratepad", "ratepad")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for code in [&self.default_from, &self.default_to] {
            if Currency::find_by_code(code).is_none() {
                bail!("Unknown currency in config: {}", code);
            }
        }
        if self.source.bucket.is_none() && self.source.korea_exim.is_none() {
            bail!("No exchange rate source configured");
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.refresh_interval_secs).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.default_from, "KRW");
        assert_eq!(config.default_to, "USD");
        assert_eq!(config.display_precision, 2);
        assert_eq!(config.refresh_interval(), chrono::Duration::minutes(5));
        assert_eq!(
            config.source.bucket.unwrap().url,
            bucket::DEFAULT_BUCKET_URL
        );
    }

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
source:
  bucket:
    url: "http://example.com/rates.json"
  korea_exim:
    auth_key: "secret"
default_from: "JPY"
default_to: "EUR"
display_precision: 4
refresh_interval_secs: 60
data_path: "/tmp/ratepad"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(
            config.source.bucket.as_ref().unwrap().url,
            "http://example.com/rates.json"
        );
        let exim = config.source.korea_exim.as_ref().unwrap();
        assert_eq!(exim.auth_key, "secret");
        assert_eq!(exim.base_url, korea_exim::DEFAULT_BASE_URL);
        assert_eq!(config.default_from, "JPY");
        assert_eq!(config.default_to, "EUR");
        assert_eq!(config.display_precision, 4);
        assert_eq!(config.refresh_interval_secs, 60);
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/ratepad")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_output_hides_auth_key() {
        let config = AppConfig {
            source: SourceConfig {
                bucket: None,
                korea_exim: Some(KoreaEximSourceConfig {
                    base_url: korea_exim::DEFAULT_BASE_URL.to_string(),
                    auth_key: "exim-key-1234".to_string(),
                }),
            },
            ..AppConfig::default()
        };
        let debug = format!("{config:#?}");
        assert!(!debug.contains("exim-key-1234"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains(korea_exim::DEFAULT_BASE_URL));
    }

    #[test]
    fn test_validate_rejects_unknown_currency() {
        let config = AppConfig {
            default_to: "XYZ".to_string(),
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("XYZ"));
    }

    #[test]
    fn test_validate_requires_a_source() {
        let config = AppConfig {
            source: SourceConfig {
                bucket: None,
                korea_exim: None,
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
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
}
