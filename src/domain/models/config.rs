use serde::{Deserialize, Serialize};

use super::attempt::DEFAULT_WINDOW_SIZE;
use super::practice_state::DEFAULT_MIN_STREAK_TO_SWAP;
use super::selection::{default_mode_bands, ModeBand};

/// Main configuration structure for zero-coach
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Recommendation engine tuning
    #[serde(default)]
    pub engine: EngineConfig,

    /// Where the target catalog comes from
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Practice session whose state is read and written
    #[serde(default = "default_session_key")]
    pub session_key: String,

    /// Legal/ranked mode; forces the full-random override off
    #[serde(default)]
    pub legal_mode: bool,
}

fn default_session_key() -> String {
    "default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            engine: EngineConfig::default(),
            catalog: CatalogConfig::default(),
            session_key: default_session_key(),
            legal_mode: false,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".zero-coach/zero-coach.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl DatabaseConfig {
    /// `sqlx` connection URL for the configured path.
    pub fn url(&self) -> String {
        if self.path.starts_with("sqlite:") {
            self.path.clone()
        } else {
            format!("sqlite:{}", self.path)
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling JSON log files (stderr only when unset)
    #[serde(default)]
    pub log_dir: Option<String>,

    /// File rotation: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Recommendation engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Scored attempts in the default practice window
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Attempts a target needs to count as sampled
    #[serde(default = "default_min_samples_per_target")]
    pub min_samples_per_target: u32,

    /// Sample coverage reported as sufficient (display only)
    #[serde(default = "default_sufficiency_threshold_percent")]
    pub sufficiency_threshold_percent: f64,

    /// Sample coverage below which the engine proposes full random
    #[serde(default = "default_bootstrap_coverage_percent")]
    pub bootstrap_coverage_percent: f64,

    /// Evaluations on the same target before it locks
    #[serde(default = "default_min_streak_to_swap")]
    pub min_streak_to_swap: u32,

    /// Success rate a sampled target needs to enter the Maintain pool
    #[serde(default = "default_maintain_min_success_percent")]
    pub maintain_min_success_percent: f64,

    /// Maximum wait for the mutation barrier before reporting busy
    #[serde(default = "default_mutation_timeout_ms")]
    pub mutation_timeout_ms: u64,

    /// Fixed seed for the mode draw; entropy when unset
    #[serde(default)]
    pub rng_seed: Option<u64>,

    /// Coverage bands, ascending by `min_coverage_percent`
    #[serde(default = "default_mode_bands")]
    pub mode_bands: Vec<ModeBand>,
}

const fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

const fn default_min_samples_per_target() -> u32 {
    2
}

const fn default_sufficiency_threshold_percent() -> f64 {
    80.0
}

const fn default_bootstrap_coverage_percent() -> f64 {
    25.0
}

const fn default_min_streak_to_swap() -> u32 {
    DEFAULT_MIN_STREAK_TO_SWAP
}

const fn default_maintain_min_success_percent() -> f64 {
    50.0
}

const fn default_mutation_timeout_ms() -> u64 {
    2000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            min_samples_per_target: default_min_samples_per_target(),
            sufficiency_threshold_percent: default_sufficiency_threshold_percent(),
            bootstrap_coverage_percent: default_bootstrap_coverage_percent(),
            min_streak_to_swap: default_min_streak_to_swap(),
            maintain_min_success_percent: default_maintain_min_success_percent(),
            mutation_timeout_ms: default_mutation_timeout_ms(),
            rng_seed: None,
            mode_bands: default_mode_bands(),
        }
    }
}

/// Catalog source kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSourceKind {
    /// Built-in practice map towers
    #[default]
    PracticeMap,
    /// Per-side leniency JSON documents
    LeniencyFiles,
}

/// Catalog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CatalogConfig {
    #[serde(default)]
    pub source: CatalogSourceKind,

    /// Front-side leniency document
    #[serde(default)]
    pub front_leniency_path: Option<String>,

    /// Back-side leniency document
    #[serde(default)]
    pub back_leniency_path: Option<String>,

    /// Optional `{ "<target key>": [seed, ...] }` document
    #[serde(default)]
    pub seeds_map_path: Option<String>,
}
