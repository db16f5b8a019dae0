//! Ingestion / Normalization Pipeline
//!
//! Turns the three raw inputs into the flat timeline table:
//!
//! 1. **Schedule workbook** (department sheets with monthly fill columns),
//!    normalized by [`schedule_sheet`].
//! 2. **Master workbook** (two-row merged header, one row per project), read
//!    into a [`ProjectDictionary`] by [`master`].
//! 3. **Free-text schedule export**, matched line by line against the
//!    dictionary by [`schedule_text`].
//!
//! Output rows are written with [`crate::table::write_table`]: schedule-sheet
//! rows first (sheets in configured order), then text rows in line order.
//!
//! Failure policy: a bad tier or an unreadable month header aborts the whole
//! run. Rows that cannot be placed on the timeline are skipped and only
//! logged at debug level.

pub mod master;
pub mod schedule_sheet;
pub mod schedule_text;
pub mod workbook;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use crate::config::IngestConfig;
use crate::table::write_table;
use crate::types::{Category, Phase, ProjectPhaseRecord, RoleHolders};

pub use master::{ProjectDictionary, ProjectInfo};
pub use schedule_sheet::SheetLayout;
pub use schedule_text::{LineOutcome, ScheduleTextMatcher};

// ============================================================================
// Errors
// ============================================================================

/// Fatal ingestion failures. Each one aborts the run.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("cannot read workbook {}: {message}", path.display())]
    Workbook { path: PathBuf, message: String },

    #[error("workbook {} has no sheet '{sheet}'", path.display())]
    MissingSheet { path: PathBuf, sheet: String },

    #[error("{source_name}: required column '{column}' not found in header")]
    MissingColumn { source_name: String, column: String },

    #[error("{source_name} row {row}: tier '{value}' is not an integer")]
    InvalidTier {
        source_name: String,
        row: usize,
        value: String,
    },

    #[error("{source_name}: month header '{value}' in column {column} is not a date")]
    InvalidMonthHeader {
        source_name: String,
        column: usize,
        value: String,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// Shared record building
// ============================================================================

/// Per-project identity fields copied onto every emitted phase row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectMeta {
    pub task: String,
    pub department: String,
    pub location: String,
    pub project_type: String,
    pub tier: u8,
}

impl ProjectMeta {
    /// Build one phase row. Returns `None` when `start` is after `finish`.
    pub fn record(
        &self,
        last_updated: NaiveDate,
        category: Category,
        phase: Phase,
        roles: &RoleHolders,
        start: NaiveDate,
        finish: NaiveDate,
    ) -> Option<ProjectPhaseRecord> {
        if start > finish {
            return None;
        }
        let role = |r: &Option<String>| r.clone().unwrap_or_default();
        Some(ProjectPhaseRecord {
            last_updated,
            category,
            department: self.department.clone(),
            location: self.location.clone(),
            project_type: self.project_type.clone(),
            task: self.task.clone(),
            phase,
            tier: self.tier,
            pm: roles.front_pm().unwrap_or_default().to_string(),
            pml: role(&roles.pml),
            dm: role(&roles.dm),
            pm1: role(&roles.pm1),
            pm2: role(&roles.pm2),
            start,
            finish,
        })
    }
}

/// Records from one source plus the number of rows or lines dropped.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub records: Vec<ProjectPhaseRecord>,
    pub skipped: usize,
}

/// Parse a tier cell into the stored `u8`.
pub(crate) fn parse_tier(
    cell: &workbook::Cell,
    source_name: &str,
    row: usize,
) -> Result<u8, IngestError> {
    cell.integer()
        .and_then(|n| u8::try_from(n).ok())
        .ok_or_else(|| IngestError::InvalidTier {
            source_name: source_name.to_string(),
            row,
            value: cell.text(),
        })
}

// ============================================================================
// Run
// ============================================================================

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Records per schedule sheet, in processing order
    pub sheet_rows: Vec<(String, usize)>,
    /// Records recovered from the free-text export
    pub text_rows: usize,
    /// Rows and lines dropped across all sources
    pub skipped: usize,
    /// Projects in the master dictionary
    pub projects: usize,
    pub output: PathBuf,
}

impl IngestReport {
    pub fn total_rows(&self) -> usize {
        self.sheet_rows.iter().map(|(_, n)| n).sum::<usize>() + self.text_rows
    }
}

/// Normalize every configured source into records, in output order.
pub fn collect(
    config: &IngestConfig,
    last_updated: NaiveDate,
) -> Result<(Vec<ProjectPhaseRecord>, IngestReport), IngestError> {
    let mut report = IngestReport {
        output: config.output.clone(),
        ..IngestReport::default()
    };
    let mut records = Vec::new();

    let layout = SheetLayout {
        header_row: config.schedule_header_row,
        month_column_offset: config.month_column_offset,
    };

    for sheet in &config.schedule_sheets {
        let grid = workbook::load_sheet(&config.schedule_workbook, Some(sheet))?;
        let normalized = schedule_sheet::normalize_sheet(
            &grid,
            sheet,
            &layout,
            &config.phase_labels,
            last_updated,
        )?;
        info!(
            sheet = %sheet,
            records = normalized.records.len(),
            skipped = normalized.skipped,
            "Schedule sheet normalized"
        );
        report.sheet_rows.push((sheet.clone(), normalized.records.len()));
        report.skipped += normalized.skipped;
        records.extend(normalized.records);
    }

    let master_grid = workbook::load_sheet(&config.master_workbook, None)?;
    let source_name = config.master_workbook.display().to_string();
    let dictionary = ProjectDictionary::from_grid(&master_grid, &source_name)?;
    report.projects = dictionary.len();
    info!(projects = dictionary.len(), "Master dictionary built");

    let raw = read_text(&config.raw_schedule)?;
    let matched = schedule_text::match_text(&dictionary, &raw, last_updated);
    info!(
        records = matched.records.len(),
        skipped = matched.skipped,
        "Schedule text matched"
    );
    report.text_rows = matched.records.len();
    report.skipped += matched.skipped;
    records.extend(matched.records);

    Ok((records, report))
}

/// Run the full ingestion and write the normalized table.
pub fn run(config: &IngestConfig, last_updated: NaiveDate) -> Result<IngestReport, IngestError> {
    let (records, report) = collect(config, last_updated)?;

    let io_err = |source| IngestError::Io {
        path: config.output.clone(),
        source,
    };
    let file = File::create(&config.output).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    write_table(&mut writer, &records).map_err(io_err)?;
    writer.flush().map_err(io_err)?;

    info!(
        output = %config.output.display(),
        records = records.len(),
        skipped = report.skipped,
        "Timeline table written"
    );
    Ok(report)
}

/// Read a text export, replacing invalid UTF-8 sequences.
fn read_text(path: &Path) -> Result<String, IngestError> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
