//! Advisor configuration file support.
//!
//! Reads `advisor.toml` and applies environment overrides. Every section is
//! optional; an empty file yields the defaults.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{BoundsTable, FieldBounds};
use crate::preprocessing::{FormValidator, ValidatorMode};
use crate::presentation::CropCatalog;
use crate::services::suitability::{ReferenceTable, SuitabilityEstimator};

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Advisor configuration from file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisorConfig {
    #[serde(default)]
    pub service: ServiceSettings,
    #[serde(default)]
    pub validation: ValidationSettings,
    #[serde(default)]
    pub suitability: ReferenceTable,
    #[serde(default)]
    pub catalog: CatalogSettings,
}

/// Prediction service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// "http" or "scripted"
    #[serde(default = "default_client")]
    pub client: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts after a transport failure
    #[serde(default)]
    pub max_retries: u32,
    /// Body the scripted client answers with
    #[serde(default)]
    pub offline_reply: Option<String>,
    #[serde(default)]
    pub offline_latency_ms: u64,
}

/// Validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSettings {
    /// "bounded" or "legacy"
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Per-field overrides keyed by wire name (`N`, `ph`, ...)
    #[serde(default)]
    pub bounds: BTreeMap<String, FieldBounds>,
}

/// Crop catalogue additions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Extra or replacement farming tips keyed by lowercase crop name
    #[serde(default)]
    pub tips: HashMap<String, Vec<String>>,
}

fn default_client() -> String {
    "http".to_string()
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_mode() -> String {
    ValidatorMode::Bounded.as_str().to_string()
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            client: default_client(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
            offline_reply: None,
            offline_latency_ms: 0,
        }
    }
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            bounds: BTreeMap::new(),
        }
    }
}

impl AdvisorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AdvisorConfig = toml::from_str(content)?;
        if config.service.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "service.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }

    /// Load configuration from the default location, or defaults if none exists.
    ///
    /// Searches for `advisor.toml` in:
    /// 1. Current directory
    /// 2. `crop_advisor/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = [
            PathBuf::from("advisor.toml"),
            PathBuf::from("crop_advisor/advisor.toml"),
            PathBuf::from("../advisor.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                log::info!("Loading configuration from {}", path.display());
                return Self::from_file(&path);
            }
        }

        log::info!("No advisor.toml found, using defaults");
        Ok(Self::default())
    }

    /// Apply `CROP_ADVISOR_URL`, `CROP_ADVISOR_VALIDATION` and `CROP_ADVISOR_CLIENT`.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("CROP_ADVISOR_URL") {
            self.service.base_url = url;
        }
        if let Some(mode) = lookup("CROP_ADVISOR_VALIDATION") {
            self.validation.mode = mode;
        }
        if let Some(client) = lookup("CROP_ADVISOR_CLIENT") {
            self.service.client = client;
        }
        self
    }

    pub fn validator_mode(&self) -> Result<ValidatorMode, ConfigError> {
        ValidatorMode::from_str(&self.validation.mode).map_err(ConfigError::InvalidValue)
    }

    /// Build the form validator described by the `[validation]` section.
    pub fn validator(&self) -> Result<FormValidator, ConfigError> {
        let mode = self.validator_mode()?;
        let bounds = BoundsTable::default()
            .with_overrides(&self.validation.bounds)
            .map_err(ConfigError::InvalidValue)?;
        Ok(FormValidator::new(mode, bounds))
    }

    pub fn estimator(&self) -> SuitabilityEstimator {
        SuitabilityEstimator::new(self.suitability.clone())
    }

    pub fn catalog(&self) -> CropCatalog {
        let mut catalog = CropCatalog::default();
        for (crop, tips) in &self.catalog.tips {
            catalog.set_tips(crop, tips.clone());
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AdvisorConfig::from_toml_str("").unwrap();
        assert_eq!(config.service.client, "http");
        assert_eq!(config.service.timeout_secs, 10);
        assert_eq!(config.service.max_retries, 0);
        assert_eq!(config.validator_mode().unwrap(), ValidatorMode::Bounded);
        assert_eq!(config.suitability, ReferenceTable::default());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[service]
client = "http"
base_url = "http://crops.internal:8000"
timeout_secs = 4
max_retries = 1

[validation]
mode = "bounded"

[validation.bounds.ph]
min = 3.5
max = 9.9

[suitability.temperature]
reference = 24.0
weight = 2.0

[catalog.tips]
lentil = ["Sow after the monsoon recedes"]
"#;

        let config = AdvisorConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.service.base_url, "http://crops.internal:8000");
        assert_eq!(config.service.max_retries, 1);

        let validator = config.validator().unwrap();
        assert_eq!(validator.bounds().get(Field::Ph), FieldBounds::new(3.5, 9.9));

        assert_eq!(config.suitability.temperature.reference, 24.0);
        assert_eq!(config.suitability.humidity.reference, 70.0);

        let catalog = config.catalog();
        assert_eq!(catalog.tips_for("Lentil"), ["Sow after the monsoon recedes".to_string()]);
    }

    #[test]
    fn test_min_only_bounds_override_keeps_default_max() {
        let config = AdvisorConfig::from_toml_str("[validation.bounds.ph]\nmin = 3.5\n").unwrap();
        let validator = config.validator().unwrap();
        assert_eq!(validator.bounds().get(Field::Ph), FieldBounds::new(3.5, 14.0));

        let high = validator.validate(Field::Ph, "40");
        assert!(!high.is_valid);
        assert_eq!(high.message.as_deref(), Some("pH must be at most 14"));

        let low = validator.validate(Field::Ph, "3");
        assert_eq!(low.message.as_deref(), Some("pH must be at least 3.5"));
        assert!(validator.validate(Field::Ph, "7").is_valid);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            AdvisorConfig::from_toml_str("[service]\ntimeout_secs = 0\n"),
            Err(ConfigError::InvalidValue(_))
        ));
        let config = AdvisorConfig::from_toml_str("[validation]\nmode = \"fuzzy\"\n").unwrap();
        assert!(config.validator().is_err());
        assert!(matches!(
            AdvisorConfig::from_toml_str("[service\n"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = AdvisorConfig::default().with_overrides(|key| match key {
            "CROP_ADVISOR_URL" => Some("http://10.0.0.2:5000".to_string()),
            "CROP_ADVISOR_VALIDATION" => Some("legacy".to_string()),
            _ => None,
        });
        assert_eq!(config.service.base_url, "http://10.0.0.2:5000");
        assert_eq!(config.service.client, "http");
        assert_eq!(config.validator_mode().unwrap(), ValidatorMode::Legacy);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[validation]\nmode = \"legacy\"").unwrap();
        let config = AdvisorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.validator_mode().unwrap(), ValidatorMode::Legacy);

        let missing = AdvisorConfig::from_file("/nonexistent/advisor.toml");
        assert!(matches!(missing, Err(ConfigError::ReadError { .. })));
    }
}
