use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::{CatalogSourceKind, Config};

/// Project-local configuration directory
pub const CONFIG_DIR: &str = ".zero-coach";

/// Environment variable prefix; nested keys are separated by `__`
pub const ENV_PREFIX: &str = "ZERO_COACH_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid {field}: {value}. Must be at least 1")]
    ZeroValue { field: &'static str, value: u64 },

    #[error("Invalid {field}: {value}. Must be between 0 and 100")]
    PercentOutOfRange { field: &'static str, value: f64 },

    #[error("Invalid mode bands: {0}")]
    InvalidModeBands(String),

    #[error("Session key cannot be empty")]
    EmptySessionKey,

    #[error("Leniency catalog requires both front_leniency_path and back_leniency_path")]
    MissingLeniencyFiles,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .zero-coach/config.yaml (project config, created by init)
    /// 3. .zero-coach/local.yaml (local overrides, optional)
    /// 4. Environment variables (ZERO_COACH_* prefix)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(Path::new("."))
    }

    /// Same as [`ConfigLoader::load`] with the project root at `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Config> {
        let config_dir = dir.join(CONFIG_DIR);
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(config_dir.join("config.yaml")))
            .merge(Yaml::file(config_dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file over the defaults.
    /// Environment variables still apply.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.trim().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        if !["json", "pretty"].contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }
        if !["daily", "hourly", "never"].contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(config.logging.rotation.clone()));
        }

        let engine = &config.engine;
        let counts = [
            ("window_size", engine.window_size as u64),
            ("min_samples_per_target", u64::from(engine.min_samples_per_target)),
            ("min_streak_to_swap", u64::from(engine.min_streak_to_swap)),
            ("mutation_timeout_ms", engine.mutation_timeout_ms),
        ];
        if let Some((field, value)) = counts.into_iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::ZeroValue { field, value });
        }

        let percents = [
            ("sufficiency_threshold_percent", engine.sufficiency_threshold_percent),
            ("bootstrap_coverage_percent", engine.bootstrap_coverage_percent),
            ("maintain_min_success_percent", engine.maintain_min_success_percent),
        ];
        for (field, value) in percents {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::PercentOutOfRange { field, value });
            }
        }

        if engine.mode_bands.is_empty() {
            return Err(ConfigError::InvalidModeBands("band table is empty".to_string()));
        }
        let mut previous: Option<f64> = None;
        for band in &engine.mode_bands {
            if !(0.0..=100.0).contains(&band.min_coverage_percent) {
                return Err(ConfigError::PercentOutOfRange {
                    field: "mode_bands.min_coverage_percent",
                    value: band.min_coverage_percent,
                });
            }
            if previous.is_some_and(|p| band.min_coverage_percent <= p) {
                return Err(ConfigError::InvalidModeBands(format!(
                    "bands must ascend by min_coverage_percent (at {})",
                    band.min_coverage_percent
                )));
            }
            if band.total_weight() == 0 {
                return Err(ConfigError::InvalidModeBands(format!(
                    "band at {}% has zero total weight",
                    band.min_coverage_percent
                )));
            }
            previous = Some(band.min_coverage_percent);
        }

        if config.session_key.trim().is_empty() {
            return Err(ConfigError::EmptySessionKey);
        }

        if config.catalog.source == CatalogSourceKind::LeniencyFiles
            && (config.catalog.front_leniency_path.is_none() || config.catalog.back_leniency_path.is_none())
        {
            return Err(ConfigError::MissingLeniencyFiles);
        }

        Ok(())
    }
}
