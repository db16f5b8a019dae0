//! System-wide default constants.
//!
//! Built-in values used when `timeline_config.toml` leaves a key unset.
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Config Discovery
// ============================================================================

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "TIMELINE_CONFIG";

/// Config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "timeline_config.toml";

// ============================================================================
// Ingestion
// ============================================================================

/// Master workbook with the two-row merged header.
pub const MASTER_WORKBOOK: &str = "Projects_info.xlsx";

/// Department schedule workbook.
pub const SCHEDULE_WORKBOOK: &str = "Verkefnaplan í VOS.xlsx";

/// Department sheets read from the schedule workbook, in output order.
pub const SCHEDULE_SHEETS: [&str; 2] = ["V&V", "SOF"];

/// Zero-based header row of the department sheets.
pub const SCHEDULE_HEADER_ROW: usize = 1;

/// Zero-based index of the first month column.
pub const MONTH_COLUMN_OFFSET: usize = 8;

/// Width of the identity block that precedes the month columns.
pub const IDENTITY_COLUMNS: usize = 7;

/// Free-text schedule export.
pub const RAW_SCHEDULE: &str = "raw_data.txt";

/// Normalized table written by ingestion and read by the dashboard.
pub const OUTPUT_TABLE: &str = "formatted_data.csv";

// ============================================================================
// Dashboard
// ============================================================================

/// Front-PM value meaning "no responsible person".
pub const UNKNOWN_PM_MARKER: &str = "xx";

pub const DEFAULT_DEPARTMENTS: [&str; 1] = ["FUPP"];

/// Closed location set offered by the dashboard.
pub const LOCATIONS: [&str; 3] = ["Terminals", "Airfield", "Landside"];

/// Closed type set offered by the dashboard.
pub const TYPES: [&str; 4] = ["Building", "Civil", "Utilities", "Strategies and Plans"];

pub const DEFAULT_TYPES: [&str; 2] = ["Building", "Civil"];

/// Tier values offered by the dashboard; 1 is highest priority.
pub const TIERS: [u8; 3] = [1, 2, 3];

/// Lower bound on chart height (px).
pub const MIN_CHART_HEIGHT_PX: u32 = 850;

/// Height per project row (px).
pub const ROW_HEIGHT_PX: u32 = 25;

// ============================================================================
// Colors
// ============================================================================

/// Neutral gray for anything without a mapped color.
pub const FALLBACK_COLOR: &str = "#cfcfcf";

/// Phase colors in lifecycle order.
pub const PHASE_COLORS: [(&str, &str); 8] = [
    ("Stage 0", "#5c9977"),
    ("Stage 1", "#faca78"),
    ("Stage 2", "#a163a2"),
    ("Stage 3", "#BB8B3F"),
    ("Stage 4", "#DB2A12"),
    ("Procurement", "#00969e"),
    ("Stage 5", "#004DF4"),
    ("Stage 6", "#e0dd1b"),
];

// ============================================================================
// HTTP Server
// ============================================================================

pub const SERVER_ADDR: &str = "0.0.0.0:8050";

/// Overrides `[server] addr`; the `--addr` flag overrides both.
pub const SERVER_ADDR_ENV_VAR: &str = "TIMELINE_SERVER_ADDR";

/// Comma-separated allowed CORS origins; unset allows any origin.
pub const CORS_ORIGINS_ENV_VAR: &str = "TIMELINE_CORS_ORIGINS";
