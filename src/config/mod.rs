use crate::scoring::level::{EngineerLevel, UnknownLevel, WeightTable, WeightTableError};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let default_level = env::var("SCORE_DEFAULT_LEVEL")
            .unwrap_or_else(|_| "mid".to_string())
            .parse::<EngineerLevel>()
            .map_err(|source| ConfigError::InvalidLevel { source })?;

        let weights_path = env::var("SCORE_WEIGHTS_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let batch_concurrency = env::var("SCORE_BATCH_CONCURRENCY")
            .unwrap_or_else(|_| "8".to_string())
            .parse::<usize>()
            .ok()
            .filter(|value| *value > 0)
            .ok_or(ConfigError::InvalidConcurrency)?;

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringConfig {
                default_level,
                weights_path,
                batch_concurrency,
            },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Knobs for the score engine itself.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Level applied when an evaluation carries neither a proposed nor a current level.
    pub default_level: EngineerLevel,
    pub weights_path: Option<PathBuf>,
    pub batch_concurrency: usize,
}

impl ScoringConfig {
    /// Resolve the active weight table, reading the override file when one is configured.
    pub fn weight_table(&self) -> Result<WeightTable, ConfigError> {
        let Some(path) = &self.weights_path else {
            return Ok(WeightTable::standard());
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::WeightsFile {
            path: path.clone(),
            source,
        })?;
        let entries = serde_json::from_str(&raw).map_err(|source| ConfigError::WeightsFormat {
            path: path.clone(),
            source,
        })?;

        WeightTable::from_entries(entries).map_err(ConfigError::Weights)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            default_level: EngineerLevel::Mid,
            weights_path: None,
            batch_concurrency: 8,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidLevel {
        source: UnknownLevel,
    },
    InvalidConcurrency,
    WeightsFile {
        path: PathBuf,
        source: std::io::Error,
    },
    WeightsFormat {
        path: PathBuf,
        source: serde_json::Error,
    },
    Weights(WeightTableError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidLevel { source } => {
                write!(f, "SCORE_DEFAULT_LEVEL is invalid: {source}")
            }
            ConfigError::InvalidConcurrency => {
                write!(f, "SCORE_BATCH_CONCURRENCY must be a positive integer")
            }
            ConfigError::WeightsFile { path, .. } => {
                write!(f, "unable to read weight table at {}", path.display())
            }
            ConfigError::WeightsFormat { path, .. } => {
                write!(f, "weight table at {} is not valid JSON", path.display())
            }
            ConfigError::Weights(err) => write!(f, "weight table rejected: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidLevel { source } => Some(source),
            ConfigError::InvalidConcurrency => None,
            ConfigError::WeightsFile { source, .. } => Some(source),
            ConfigError::WeightsFormat { source, .. } => Some(source),
            ConfigError::Weights(err) => Some(err),
        }
    }
}
