use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::AnalysisOptions;
use crate::import::TimestampPolicy;
use crate::logging::LogConfig;
use crate::models::UserProfile;
use crate::segments::DEFAULT_PAUSE_THRESHOLD_SECONDS;
use crate::smoothing::DEFAULT_SMOOTHING_WINDOW;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// Directory scanned for GPX tracks
    pub data_dir: PathBuf,

    /// Track analysis parameters
    pub analysis: AnalysisSettings,

    /// User attributes for energy estimates
    #[serde(default)]
    pub profile: UserProfile,

    #[serde(default)]
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Track analysis settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Gaps longer than this are treated as pauses, seconds
    pub pause_threshold_seconds: f64,

    /// Samples per smoothing window
    pub smoothing_window: usize,

    /// Handling of timestamps that go backwards
    pub timestamp_policy: TimestampPolicy,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        AnalysisSettings {
            pause_threshold_seconds: DEFAULT_PAUSE_THRESHOLD_SECONDS,
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
            timestamp_policy: TimestampPolicy::Reject,
        }
    }
}

impl AnalysisSettings {
    pub fn options(&self) -> AnalysisOptions {
        AnalysisOptions {
            pause_threshold_seconds: self.pause_threshold_seconds,
            smoothing_window: self.smoothing_window,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            data_dir: PathBuf::from("./data"),
            analysis: AnalysisSettings::default(),
            profile: UserProfile::default(),
            logging: LogConfig::default(),
        }
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".trailstat")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_path);

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::info!(
                    path = %config_path.display(),
                    error = %e,
                    "Config not loaded, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Reject values the analysis pipeline cannot use
    pub fn validate(&self) -> Result<()> {
        self.analysis
            .options()
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid analysis settings: {}", e))?;

        if let Some(weight) = self.profile.weight_kg {
            if !weight.is_finite() || weight <= 0.0 {
                anyhow::bail!("Profile weight must be positive, got {}", weight);
            }
        }
        Ok(())
    }

    /// Get a configuration value by dotted key
    pub fn get_value(&self, key: &str) -> Option<String> {
        let value = match key {
            "data_dir" => self.data_dir.display().to_string(),
            "analysis.pause_threshold_seconds" => self.analysis.pause_threshold_seconds.to_string(),
            "analysis.smoothing_window" => self.analysis.smoothing_window.to_string(),
            "analysis.timestamp_policy" => format!("{:?}", self.analysis.timestamp_policy).to_lowercase(),
            "profile.weight_kg" => opt(self.profile.weight_kg),
            "profile.activity" => opt(self.profile.activity),
            "profile.height_cm" => opt(self.profile.height_cm),
            "profile.age" => opt(self.profile.age),
            "profile.sex" => self
                .profile
                .sex
                .map(|s| format!("{:?}", s))
                .unwrap_or_default(),
            _ => return None,
        };
        Some(value)
    }

    /// Set a configuration value by dotted key
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let mut next = self.clone();
        match key {
            "data_dir" => next.data_dir = PathBuf::from(value),
            "analysis.pause_threshold_seconds" => {
                next.analysis.pause_threshold_seconds = value
                    .parse()
                    .with_context(|| format!("Invalid number: {}", value))?
            }
            "analysis.smoothing_window" => {
                next.analysis.smoothing_window = value
                    .parse()
                    .with_context(|| format!("Invalid window: {}", value))?
            }
            "analysis.timestamp_policy" => {
                next.analysis.timestamp_policy =
                    value.parse().map_err(|e: String| anyhow::anyhow!(e))?
            }
            "profile.weight_kg" => {
                next.profile.weight_kg = Some(
                    value
                        .parse()
                        .with_context(|| format!("Invalid weight: {}", value))?,
                )
            }
            "profile.activity" => {
                next.profile.activity = Some(value.parse().map_err(|e: String| anyhow::anyhow!(e))?)
            }
            "profile.height_cm" => {
                next.profile.height_cm = Some(
                    value
                        .parse()
                        .with_context(|| format!("Invalid height: {}", value))?,
                )
            }
            "profile.age" => {
                next.profile.age = Some(
                    value
                        .parse()
                        .with_context(|| format!("Invalid age: {}", value))?,
                )
            }
            "profile.sex" => {
                next.profile.sex = Some(value.parse().map_err(|e: String| anyhow::anyhow!(e))?)
            }
            _ => anyhow::bail!("Unknown configuration key: {}", key),
        }

        next.validate()?;
        next.metadata.updated_at = Utc::now();
        *self = next;
        Ok(())
    }

    /// Keys accepted by `get_value` / `set_value`
    pub fn keys() -> &'static [&'static str] {
        &[
            "data_dir",
            "analysis.pause_threshold_seconds",
            "analysis.smoothing_window",
            "analysis.timestamp_policy",
            "profile.weight_kg",
            "profile.activity",
            "profile.height_cm",
            "profile.age",
            "profile.sex",
        ]
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Activity;
    use tempfile::tempdir;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.metadata.version, deserialized.metadata.version);
        assert_eq!(config.analysis, deserialized.analysis);
    }

    #[test]
    fn test_config_file_io() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut original = AppConfig::default();
        original.set_value("profile.weight_kg", "72.5").unwrap();
        original.set_value("profile.activity", "Running").unwrap();
        original.set_value("analysis.timestamp_policy", "sort").unwrap();

        original.save_to_file(&config_path).unwrap();
        let loaded = AppConfig::load_from_file(&config_path).unwrap();

        assert_eq!(loaded.profile.weight_kg, Some(72.5));
        assert_eq!(loaded.profile.activity, Some(Activity::Running));
        assert_eq!(loaded.analysis.timestamp_policy, TimestampPolicy::Sort);
    }

    #[test]
    fn test_get_and_set_values() {
        let mut config = AppConfig::default();
        assert_eq!(
            config.get_value("analysis.pause_threshold_seconds").as_deref(),
            Some("60")
        );
        assert_eq!(config.get_value("profile.weight_kg").as_deref(), Some(""));

        config.set_value("analysis.smoothing_window", "7").unwrap();
        assert_eq!(config.analysis.smoothing_window, 7);
        assert!(config.get_value("nope").is_none());
        assert!(config.set_value("nope", "1").is_err());

        for key in AppConfig::keys() {
            assert!(config.get_value(key).is_some(), "missing getter for {}", key);
        }
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = AppConfig::default();
        assert!(config.set_value("profile.weight_kg", "-4").is_err());
        assert!(config.set_value("analysis.smoothing_window", "0").is_err());
        assert!(config.set_value("profile.sex", "robot").is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load_or_default(Some(&dir.path().join("absent.toml")));
        assert_eq!(config.analysis, AnalysisSettings::default());
    }
}
