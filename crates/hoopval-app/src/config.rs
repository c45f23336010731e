// Configuration loading and parsing (analysis.toml).

use chrono::NaiveDate;
use hoopval_core::{CategoryContext, CategorySet, PuntSelection, RateAggregation};
use serde::Deserialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no analysis config at {path}; run from the crate root so defaults/analysis.toml can seed it")]
    Missing { path: PathBuf },

    #[error("{path} is not valid analysis TOML: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("`{field}` {message}")]
    Invalid { field: String, message: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ConfigError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub cohort: CohortConfig,
    pub data_paths: DataPaths,
    pub playoffs: Option<PlayoffWindow>,
}

/// The `[analysis]` section with its names already resolved.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub context: CategoryContext,
    pub categories: CategorySet,
    /// Punt tokens as written, kept for display.
    pub punt_tokens: Vec<String>,
    pub punt: PuntSelection,
    pub rate_aggregation: RateAggregation,
    /// Leave injured and IL-slotted roster players out of team totals.
    pub exclude_injured: bool,
}

// ---------------------------------------------------------------------------
// analysis.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire analysis.toml file.
#[derive(Debug, Clone, Deserialize)]
struct AnalysisFile {
    analysis: AnalysisSection,
    cohort: CohortConfig,
    data_paths: DataPaths,
    #[serde(default)]
    playoffs: Option<PlayoffWindow>,
}

#[derive(Debug, Clone, Deserialize)]
struct AnalysisSection {
    context: String,
    #[serde(default)]
    punt: Vec<String>,
    #[serde(default)]
    rate_aggregation: RateAggregation,
    #[serde(default = "default_true")]
    exclude_injured: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct CohortConfig {
    /// Only records from this season enter the analysis, e.g. `"2023-24"`.
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub min_games: u32,
    pub pool_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub season_rows: String,
    #[serde(default)]
    pub game_rows: Option<String>,
    #[serde(default)]
    pub roster: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PlayoffWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

const CONFIG_FILE: &str = "analysis.toml";

fn config_path(base_dir: &Path) -> PathBuf {
    base_dir.join("config").join(CONFIG_FILE)
}

/// Load and validate `config/analysis.toml` under `base_dir`.
///
/// Does not seed from defaults; `load_config` does that first.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = config_path(base_dir);
    let text = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigError::Missing { path: path.clone() },
        _ => ConfigError::Io {
            path: path.clone(),
            source: e,
        },
    })?;
    let file: AnalysisFile =
        toml::from_str(&text).map_err(|source| ConfigError::Parse { path, source })?;

    let context = file
        .analysis
        .context
        .parse::<CategoryContext>()
        .map_err(|e| ConfigError::invalid("analysis.context", e.to_string()))?;
    let punt = PuntSelection::parse(&file.analysis.punt)
        .map_err(|e| ConfigError::invalid("analysis.punt", e.to_string()))?;

    let config = Config {
        analysis: AnalysisConfig {
            context,
            categories: CategorySet::for_context(context),
            punt_tokens: file.analysis.punt,
            punt,
            rate_aggregation: file.analysis.rate_aggregation,
            exclude_injured: file.analysis.exclude_injured,
        },
        cohort: file.cohort,
        data_paths: file.data_paths,
        playoffs: file.playoffs,
    };

    validate(&config)?;

    Ok(config)
}

/// Copy `defaults/analysis.toml` to `config/analysis.toml` when the latter
/// does not exist yet. Returns the written path, or `None` when there was
/// nothing to seed. An existing config is never touched.
pub fn seed_config(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let source = base_dir.join("defaults").join(CONFIG_FILE);
    let target = config_path(base_dir);
    if target.exists() || !source.is_file() {
        return Ok(None);
    }

    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(io_error(dir))?;
    }
    let defaults = std::fs::read(&source).map_err(io_error(&source))?;

    // Never overwrite an existing config.
    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(mut file) => {
            file.write_all(&defaults).map_err(io_error(&target))?;
            info!("seeded {} from {}", target.display(), source.display());
            Ok(Some(target))
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(io_error(&target)(e)),
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ConfigError {
    let path = path.to_path_buf();
    move |source| ConfigError::Io { path, source }
}

/// Seed and load the config relative to the current working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
        path: PathBuf::from("."),
        source,
    })?;
    seed_config(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.cohort.pool_size == 0 {
        return Err(ConfigError::invalid("cohort.pool_size", "must be greater than 0"));
    }

    if config.data_paths.season_rows.trim().is_empty() {
        return Err(ConfigError::invalid("data_paths.season_rows", "must not be empty"));
    }

    if let Some(window) = &config.playoffs {
        if window.start > window.end {
            return Err(ConfigError::invalid(
                "playoffs.start",
                format!("must not be after playoffs.end ({} > {})", window.start, window.end),
            ));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
