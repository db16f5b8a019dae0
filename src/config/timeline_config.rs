//! Timeline Configuration - ingestion inputs, dashboard defaults and colors
//!
//! Every section implements `Default` with the built-in values from
//! [`super::defaults`], so a missing file or a partial file behaves exactly
//! like the stock deployment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::defaults;
use crate::ingest::schedule_sheet::default_phase_labels;
use crate::query::{ColorMode, SortKey};
use crate::types::Phase;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration.
///
/// Load with `TimelineConfig::load()` which searches:
/// 1. `$TIMELINE_CONFIG` env var
/// 2. `./timeline_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Ingestion sources and output
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Table location and initial dashboard selections
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Phase and PM color tables
    #[serde(default)]
    pub colors: ColorsConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl TimelineConfig {
    /// Load configuration using the standard search order:
    /// 1. `$TIMELINE_CONFIG` environment variable
    /// 2. `./timeline_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded config from TIMELINE_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from TIMELINE_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "TIMELINE_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./timeline_config.toml
        let local = PathBuf::from(defaults::CONFIG_FILE_NAME);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded config from ./timeline_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./timeline_config.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No timeline_config.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate TOML text. Unknown keys are logged, not rejected.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Timeline config saved");
        Ok(())
    }

    /// Validate values that would make ingestion or charting meaningless.
    ///
    /// Rules:
    /// - At least one schedule sheet
    /// - Month columns start after the identity block
    /// - Chart sizes are positive
    /// - Colors are `#RRGGBB`
    /// - Default tiers are within 1..=3
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        if self.ingest.schedule_sheets.is_empty() {
            errors.push("ingest.schedule_sheets must name at least one sheet".to_string());
        }
        if self.ingest.month_column_offset <= defaults::IDENTITY_COLUMNS {
            errors.push(format!(
                "ingest.month_column_offset = {} must be greater than {} (identity columns)",
                self.ingest.month_column_offset,
                defaults::IDENTITY_COLUMNS
            ));
        }

        let d = &self.dashboard;
        if d.min_chart_height_px == 0 {
            errors.push("dashboard.min_chart_height_px must be > 0".to_string());
        }
        if d.row_height_px == 0 {
            errors.push("dashboard.row_height_px must be > 0".to_string());
        }
        if d.unknown_pm.trim().is_empty() {
            errors.push("dashboard.unknown_pm must not be empty".to_string());
        }
        for tier in &d.default_tiers {
            if !defaults::TIERS.contains(tier) {
                errors.push(format!("dashboard.default_tiers contains {tier}, expected 1..=3"));
            }
        }

        let c = &self.colors;
        Self::check_color("colors.fallback", &c.fallback, &mut errors);
        for (key, color) in &c.phase {
            Self::check_color(&format!("colors.phase.\"{key}\""), color, &mut errors);
        }
        for (key, color) in &c.pm {
            Self::check_color(&format!("colors.pm.\"{key}\""), color, &mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_color(name: &str, value: &str, errors: &mut Vec<String>) {
        let hex = value.strip_prefix('#').unwrap_or("");
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            errors.push(format!("{name} = '{value}' is not a #RRGGBB color"));
        }
    }
}

// ============================================================================
// Config Error
// ============================================================================

/// Errors that can occur during config loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Ingest
// ============================================================================

/// Ingestion inputs, layout and output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Snapshot date stamped on every row; today when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_date: Option<NaiveDate>,

    pub master_workbook: PathBuf,
    pub schedule_workbook: PathBuf,
    /// Department sheets, processed in this order
    pub schedule_sheets: Vec<String>,
    pub schedule_header_row: usize,
    pub month_column_offset: usize,
    pub raw_schedule: PathBuf,
    pub output: PathBuf,

    /// Sub-phase label to canonical phase
    pub phase_labels: BTreeMap<String, Phase>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            last_updated_date: None,
            master_workbook: PathBuf::from(defaults::MASTER_WORKBOOK),
            schedule_workbook: PathBuf::from(defaults::SCHEDULE_WORKBOOK),
            schedule_sheets: defaults::SCHEDULE_SHEETS.map(String::from).to_vec(),
            schedule_header_row: defaults::SCHEDULE_HEADER_ROW,
            month_column_offset: defaults::MONTH_COLUMN_OFFSET,
            raw_schedule: PathBuf::from(defaults::RAW_SCHEDULE),
            output: PathBuf::from(defaults::OUTPUT_TABLE),
            phase_labels: default_phase_labels(),
        }
    }
}

impl IngestConfig {
    /// Configured snapshot date, or `today`.
    pub fn last_updated_or(&self, today: NaiveDate) -> NaiveDate {
        self.last_updated_date.unwrap_or(today)
    }
}

// ============================================================================
// Dashboard
// ============================================================================

/// Table location, unknown-PM marker, initial selections and chart sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Normalized table to serve
    pub data: PathBuf,
    pub unknown_pm: String,
    pub default_departments: Vec<String>,
    pub default_locations: Vec<String>,
    pub default_types: Vec<String>,
    pub default_tiers: Vec<u8>,
    pub default_sort: SortKey,
    pub default_color_mode: ColorMode,
    pub min_chart_height_px: u32,
    pub row_height_px: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data: PathBuf::from(defaults::OUTPUT_TABLE),
            unknown_pm: defaults::UNKNOWN_PM_MARKER.to_string(),
            default_departments: defaults::DEFAULT_DEPARTMENTS.map(String::from).to_vec(),
            default_locations: defaults::LOCATIONS.map(String::from).to_vec(),
            default_types: defaults::DEFAULT_TYPES.map(String::from).to_vec(),
            default_tiers: defaults::TIERS.to_vec(),
            default_sort: SortKey::default(),
            default_color_mode: ColorMode::default(),
            min_chart_height_px: defaults::MIN_CHART_HEIGHT_PX,
            row_height_px: defaults::ROW_HEIGHT_PX,
        }
    }
}

// ============================================================================
// Colors
// ============================================================================

/// Static color tables with a shared fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub fallback: String,
    /// Phase label to color
    pub phase: BTreeMap<String, String>,
    /// Front PM to color
    pub pm: BTreeMap<String, String>,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            fallback: defaults::FALLBACK_COLOR.to_string(),
            phase: defaults::PHASE_COLORS
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            pm: BTreeMap::from([(
                defaults::UNKNOWN_PM_MARKER.to_string(),
                defaults::FALLBACK_COLOR.to_string(),
            )]),
        }
    }
}

// ============================================================================
// Server
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server bind address.
    ///
    /// Can be overridden by `TIMELINE_SERVER_ADDR` env var or `--addr` CLI flag.
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    defaults::SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

impl ServerConfig {
    /// Bind address after applying the `TIMELINE_SERVER_ADDR` override.
    pub fn effective_addr(&self) -> String {
        std::env::var(defaults::SERVER_ADDR_ENV_VAR).unwrap_or_else(|_| self.addr.clone())
    }
}

// ============================================================================
// Tests
// ============================================================================
