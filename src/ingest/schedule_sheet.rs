//! Department Schedule Sheet Normalizer
//!
//! Each department sheet has an identity block (project, sub-phase,
//! department, responsible party, location, type, tier) followed by one column
//! per month. A row's phase runs from the first filled month to the last.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use super::workbook::Grid;
use super::{parse_tier, IngestError, Normalized, ProjectMeta};
use crate::types::{Category, Phase, RoleHolders};

/// Header columns of the identity block, matched after trimming.
pub const COL_PROJECT: &str = "Verkefnaheiti";
pub const COL_SUB_PHASE: &str = "Undirheiti";
pub const COL_DEPARTMENT: &str = "Department";
pub const COL_RESPONSIBLE: &str = "Ábyrgð";
pub const COL_LOCATION: &str = "Location";
pub const COL_TYPE: &str = "Type";
pub const COL_TIER: &str = "Tier";

/// Where the header sits and where the month columns begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    /// Zero-based header row; data starts on the next row
    pub header_row: usize,
    /// Zero-based index of the first month column
    pub month_column_offset: usize,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            header_row: crate::config::defaults::SCHEDULE_HEADER_ROW,
            month_column_offset: crate::config::defaults::MONTH_COLUMN_OFFSET,
        }
    }
}

/// Column indices of the identity block.
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    project: usize,
    sub_phase: usize,
    department: usize,
    responsible: usize,
    location: usize,
    project_type: usize,
    tier: usize,
}

impl ColumnMap {
    fn from_header(header: &[String], source_name: &str) -> Result<Self, IngestError> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| IngestError::MissingColumn {
                    source_name: source_name.to_string(),
                    column: name.to_string(),
                })
        };
        Ok(Self {
            project: find(COL_PROJECT)?,
            sub_phase: find(COL_SUB_PHASE)?,
            department: find(COL_DEPARTMENT)?,
            responsible: find(COL_RESPONSIBLE)?,
            location: find(COL_LOCATION)?,
            project_type: find(COL_TYPE)?,
            tier: find(COL_TIER)?,
        })
    }
}

/// Normalize one department sheet.
///
/// `phase_labels` maps trimmed sub-phase labels to canonical phases; rows with
/// any other label are skipped.
pub fn normalize_sheet(
    grid: &Grid,
    source_name: &str,
    layout: &SheetLayout,
    phase_labels: &BTreeMap<String, Phase>,
    last_updated: NaiveDate,
) -> Result<Normalized, IngestError> {
    let header = grid.header(layout.header_row);
    let cols = ColumnMap::from_header(&header, source_name)?;
    let month_cols = layout.month_column_offset..grid.col_count();

    let mut out = Normalized::default();

    for r in (layout.header_row + 1)..grid.row_count() {
        let row_num = r + 1;
        let task = grid.cell(r, cols.project).text();
        if task.is_empty() {
            continue;
        }

        let tier = parse_tier(grid.cell(r, cols.tier), source_name, row_num)?;

        let label = grid.cell(r, cols.sub_phase).text();
        let Some(&phase) = phase_labels.get(&label) else {
            debug!(sheet = source_name, row = row_num, label = %label, "Unmapped sub-phase, row skipped");
            out.skipped += 1;
            continue;
        };

        let mut filled = month_cols.clone().filter(|&c| !grid.cell(r, c).is_blank());
        let Some(first) = filled.next() else {
            debug!(sheet = source_name, row = row_num, task = %task, "No filled months, row skipped");
            out.skipped += 1;
            continue;
        };
        let last = filled.last().unwrap_or(first);

        let start = month_header_date(grid, layout.header_row, first, source_name)?;
        let finish = month_header_date(grid, layout.header_row, last, source_name)?;

        let responsible = grid.cell(r, cols.responsible).text();
        let roles = RoleHolders {
            pm1: Some(responsible),
            ..RoleHolders::default()
        };
        let meta = ProjectMeta {
            task,
            department: grid.cell(r, cols.department).text(),
            location: grid.cell(r, cols.location).text(),
            project_type: grid.cell(r, cols.project_type).text(),
            tier,
        };

        match meta.record(last_updated, Category::Project, phase, &roles, start, finish) {
            Some(record) => out.records.push(record),
            None => {
                debug!(sheet = source_name, row = row_num, task = %meta.task, "Month headers out of order, row skipped");
                out.skipped += 1;
            }
        }
    }

    Ok(out)
}

fn month_header_date(
    grid: &Grid,
    header_row: usize,
    col: usize,
    source_name: &str,
) -> Result<NaiveDate, IngestError> {
    let cell = grid.cell(header_row, col);
    cell.date().ok_or_else(|| IngestError::InvalidMonthHeader {
        source_name: source_name.to_string(),
        column: col,
        value: cell.text(),
    })
}

/// Built-in sub-phase label table.
pub fn default_phase_labels() -> BTreeMap<String, Phase> {
    [
        ("PME & RFP", Phase::Procurement),
        ("Útboðsferli og samningur", Phase::Procurement),
        ("Innleiðing", Phase::Stage5),
        ("Skipting og hönnun á svæði", Phase::Stage4),
    ]
    .into_iter()
    .map(|(label, phase)| (label.to_string(), phase))
    .collect()
}
