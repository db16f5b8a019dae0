//! Normalized Timeline Table
//!
//! The flat table written by ingestion and read back, once, by the query
//! service. Loading is all-or-nothing: any unreadable row fails the load, and
//! [`TimelineTable::load_or_empty`] turns that failure into an empty table so
//! the service still starts.

pub mod csv;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

pub use self::csv::{write_table, COLUMNS};
use crate::types::dates::parse_date_token;
use crate::types::{Phase, ProjectPhaseRecord};

#[derive(Error, Debug)]
pub enum TableError {
    #[error("cannot read table {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("table is empty (no header row)")]
    Empty,

    #[error("header is missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("line {line}: bad {column} value '{value}'")]
    Field {
        line: usize,
        column: &'static str,
        value: String,
    },
}

/// Immutable in-memory copy of the normalized table.
#[derive(Debug, Clone, Default)]
pub struct TimelineTable {
    records: Vec<ProjectPhaseRecord>,
}

impl TimelineTable {
    pub fn new(records: Vec<ProjectPhaseRecord>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a table file. Empty front PMs are replaced by `unknown_marker`.
    pub fn load(path: &Path, unknown_marker: &str) -> Result<Self, TableError> {
        let text = std::fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(&text, unknown_marker)?;
        info!(path = %path.display(), records = table.len(), "Timeline table loaded");
        Ok(table)
    }

    /// Like [`load`](Self::load), but any failure yields an empty table.
    pub fn load_or_empty(path: &Path, unknown_marker: &str) -> Self {
        Self::load(path, unknown_marker).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Timeline table unavailable, serving empty table");
            Self::empty()
        })
    }

    /// Parse table text in the layout produced by [`write_table`].
    pub fn parse(text: &str, unknown_marker: &str) -> Result<Self, TableError> {
        let mut rows = csv::logical_records(text).into_iter();
        let (_, header) = rows.next().ok_or(TableError::Empty)?;
        let header: Vec<String> = csv::csv_split(&header)
            .into_iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut index = [0usize; COLUMNS.len()];
        for (slot, name) in index.iter_mut().zip(COLUMNS) {
            *slot = header
                .iter()
                .position(|h| h == name)
                .ok_or(TableError::MissingColumn(name))?;
        }

        let mut records = Vec::new();
        for (line, raw) in rows {
            if raw.trim().is_empty() {
                continue;
            }
            let fields = csv::csv_split(&raw);
            let field = |i: usize| fields.get(index[i]).map_or("", |s| s.trim());
            let bad = |i: usize| TableError::Field {
                line,
                column: COLUMNS[i],
                value: field(i).to_string(),
            };
            let date = |i: usize| parse_date_token(field(i)).ok_or_else(|| bad(i));

            let pm = match field(8) {
                "" => unknown_marker.to_string(),
                pm => pm.to_string(),
            };

            records.push(ProjectPhaseRecord {
                last_updated: date(0)?,
                category: field(1).parse().map_err(|_| bad(1))?,
                department: field(2).to_string(),
                location: field(3).to_string(),
                project_type: field(4).to_string(),
                task: field(5).to_string(),
                phase: field(6).parse().map_err(|_| bad(6))?,
                tier: field(7).parse().map_err(|_| bad(7))?,
                pm,
                pml: field(9).to_string(),
                dm: field(10).to_string(),
                pm1: field(11).to_string(),
                pm2: field(12).to_string(),
                start: date(13)?,
                finish: date(14)?,
            });
        }

        Ok(Self::new(records))
    }

    pub fn records(&self) -> &[ProjectPhaseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Newest snapshot date in the table.
    pub fn last_updated(&self) -> Option<NaiveDate> {
        self.records.iter().map(|r| r.last_updated).max()
    }

    /// Distinct departments, sorted.
    pub fn departments(&self) -> Vec<String> {
        sorted_unique(self.records.iter().map(|r| r.department.as_str()))
    }

    /// Distinct tasks, sorted.
    pub fn tasks(&self) -> Vec<String> {
        sorted_unique(self.records.iter().map(|r| r.task.as_str()))
    }

    /// Distinct phases in order of first appearance.
    pub fn phases(&self) -> Vec<Phase> {
        let mut phases = Vec::new();
        for r in &self.records {
            if !phases.contains(&r.phase) {
                phases.push(r.phase);
            }
        }
        phases
    }
}

pub(crate) fn sorted_unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}
