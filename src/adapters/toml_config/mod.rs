// TOML config adapter - Service configuration from TOML files and the environment

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adapters::http_service::DEFAULT_BASE_URL;
use crate::domain::errors::*;
use crate::domain::model::Quality;

/// Prefix of the environment variables read by [`TomlConfigAdapter::apply_env`]
pub const ENV_PREFIX: &str = "CLIPSCENE_";

/// Files searched when no path is given explicitly
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["clipscene.toml", "config/clipscene.toml"];

/// Effective client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub debounce_ms: u64,
    pub sample_period_ms: u64,
    /// Quality labels in order of preference, e.g. `["1080p", "720p"]`
    pub quality_preference: Vec<String>,
    /// Where downloaded archives are written
    pub output_dir: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
            poll_interval_ms: 1000,
            debounce_ms: 1000,
            sample_period_ms: 100,
            quality_preference: Quality::DEFAULT_PREFERENCE
                .iter()
                .map(|quality| quality.label().to_string())
                .collect(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn sample_period(&self) -> Duration {
        Duration::from_millis(self.sample_period_ms)
    }

    /// Parsed quality preference; an empty list means the default order
    pub fn preference(&self) -> Result<Vec<Quality>, DomainError> {
        if self.quality_preference.is_empty() {
            return Ok(Quality::DEFAULT_PREFERENCE.to_vec());
        }
        self.quality_preference
            .iter()
            .map(|label| Quality::parse(label))
            .collect()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            return Err(DomainError::Config("base_url cannot be empty".to_string()));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(DomainError::Config(format!(
                "base_url must start with http:// or https://, got {}",
                base_url
            )));
        }

        for (key, value) in [
            ("request_timeout_secs", self.request_timeout_secs),
            ("poll_interval_ms", self.poll_interval_ms),
            ("debounce_ms", self.debounce_ms),
            ("sample_period_ms", self.sample_period_ms),
        ] {
            if value == 0 {
                return Err(DomainError::Config(format!("{} must be greater than 0", key)));
            }
        }

        self.preference()
            .map_err(|e| DomainError::Config(format!("Invalid quality_preference: {}", e)))?;
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    clipscene: ServiceConfig,
}

#[derive(Serialize)]
struct ConfigFileRef<'a> {
    clipscene: &'a ServiceConfig,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter {
    config: ServiceConfig,
    config_file_path: Option<PathBuf>,
}

impl TomlConfigAdapter {
    /// Create new adapter holding the default configuration
    pub fn new() -> Self {
        Self {
            config: ServiceConfig::default(),
            config_file_path: None,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ServiceConfig {
        &mut self.config
    }

    pub fn into_config(self) -> ServiceConfig {
        self.config
    }

    pub fn config_file_path(&self) -> Option<&Path> {
        self.config_file_path.as_deref()
    }

    /// Load a TOML file; keys missing from its `[clipscene]` section keep their defaults
    pub fn load_config(&mut self, path: &Path) -> Result<(), DomainError> {
        if !path.exists() {
            return Err(DomainError::Config(format!(
                "Config file does not exist: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| DomainError::Config(format!("Failed to read config file: {}", e)))?;
        self.config = Self::deserialize_config(&content)?;
        self.config_file_path = Some(path.to_path_buf());
        info!(path = %path.display(), "Loaded configuration file");
        Ok(())
    }

    /// Load the first existing file among `candidates`; returns whether one was found
    pub fn load_first_existing<P: AsRef<Path>>(&mut self, candidates: &[P]) -> Result<bool, DomainError> {
        for candidate in candidates {
            let path = candidate.as_ref();
            if path.exists() {
                self.load_config(path)?;
                return Ok(true);
            }
        }
        debug!("No configuration file found");
        Ok(false)
    }

    /// Override values from `CLIPSCENE_*` variables; returns the number applied
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<usize, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(&format!("{}{}", ENV_PREFIX, key));
        let mut applied = 0;

        if let Some(value) = var("BASE_URL") {
            self.config.base_url = value;
            applied += 1;
        }
        for (key, slot) in [
            ("REQUEST_TIMEOUT_SECS", &mut self.config.request_timeout_secs),
            ("POLL_INTERVAL_MS", &mut self.config.poll_interval_ms),
            ("DEBOUNCE_MS", &mut self.config.debounce_ms),
            ("SAMPLE_PERIOD_MS", &mut self.config.sample_period_ms),
        ] {
            if let Some(value) = var(key) {
                *slot = value.trim().parse().map_err(|e| {
                    DomainError::Config(format!("Invalid value for {}{}: {}", ENV_PREFIX, key, e))
                })?;
                applied += 1;
            }
        }
        if let Some(value) = var("QUALITY_PREFERENCE") {
            self.config.quality_preference = value
                .split(',')
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(str::to_string)
                .collect();
            applied += 1;
        }
        if let Some(value) = var("OUTPUT_DIR") {
            self.config.output_dir = PathBuf::from(value);
            applied += 1;
        }

        if applied > 0 {
            info!(applied, "Applied environment overrides");
        }
        Ok(applied)
    }

    pub fn validate_config(&self) -> Result<(), DomainError> {
        self.config.validate()
    }

    /// Deserialize config from TOML string
    pub fn deserialize_config(toml_content: &str) -> Result<ServiceConfig, DomainError> {
        let file: ConfigFile = toml::from_str(toml_content)
            .map_err(|e| DomainError::Config(format!("Failed to parse TOML config: {}", e)))?;
        Ok(file.clipscene)
    }

    /// Serialize config to TOML string
    pub fn serialize_config(config: &ServiceConfig) -> Result<String, DomainError> {
        toml::to_string_pretty(&ConfigFileRef { clipscene: config })
            .map_err(|e| DomainError::Config(format!("Failed to serialize config: {}", e)))
    }
}

impl Default for TomlConfigAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(
            config.preference().unwrap(),
            vec![Quality::P1080, Quality::P1440, Quality::P720, Quality::P4K]
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config(
            r#"
[clipscene]
base_url = "https://clips.example.com"
poll_interval_ms = 250
"#,
        );
        let mut adapter = TomlConfigAdapter::new();
        adapter.load_config(file.path()).unwrap();

        let config = adapter.config();
        assert_eq!(config.base_url, "https://clips.example.com");
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.debounce_ms, 1000);
        assert_eq!(adapter.config_file_path(), Some(file.path()));
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let mut adapter = TomlConfigAdapter::new();
        assert!(adapter.load_config(Path::new("/nonexistent/clipscene.toml")).is_err());

        let file = write_config("[clipscene\nbase_url = ");
        assert!(matches!(
            adapter.load_config(file.path()),
            Err(DomainError::Config(_))
        ));
    }

    #[test]
    fn test_load_first_existing() {
        let file = write_config("[clipscene]\ndebounce_ms = 300\n");
        let mut adapter = TomlConfigAdapter::new();
        let found = adapter
            .load_first_existing(&[PathBuf::from("/nonexistent.toml"), file.path().to_path_buf()])
            .unwrap();
        assert!(found);
        assert_eq!(adapter.config().debounce_ms, 300);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_config("[clipscene]\nbase_url = \"http://file:8000\"\n");
        let mut adapter = TomlConfigAdapter::new();
        adapter.load_config(file.path()).unwrap();

        let env: HashMap<String, String> = [
            ("CLIPSCENE_BASE_URL", "http://env:9000"),
            ("CLIPSCENE_POLL_INTERVAL_MS", "500"),
            ("CLIPSCENE_QUALITY_PREFERENCE", "720p, 4K"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let applied = adapter.apply_env(|key| env.get(key).cloned()).unwrap();
        assert_eq!(applied, 3);
        let config = adapter.config();
        assert_eq!(config.base_url, "http://env:9000");
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.preference().unwrap(), vec![Quality::P720, Quality::P4K]);
    }

    #[test]
    fn test_env_rejects_non_numeric_interval() {
        let mut adapter = TomlConfigAdapter::new();
        let result = adapter.apply_env(|key| {
            (key == "CLIPSCENE_DEBOUNCE_MS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(DomainError::Config(_))));
    }

    #[test]
    fn test_validation_errors() {
        let mut config = ServiceConfig::default();
        config.base_url = "localhost:8000".to_string();
        assert!(config.validate().is_err());

        let mut config = ServiceConfig::default();
        config.poll_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = ServiceConfig::default();
        config.quality_preference = vec!["8K".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serialized_config_reloads() {
        let mut config = ServiceConfig::default();
        config.debounce_ms = 42;
        let text = TomlConfigAdapter::serialize_config(&config).unwrap();
        assert!(text.contains("[clipscene]"));
        assert_eq!(TomlConfigAdapter::deserialize_config(&text).unwrap(), config);
    }
}
