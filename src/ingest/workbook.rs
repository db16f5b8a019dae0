//! Spreadsheet Grid Loader
//!
//! Reads one worksheet through `calamine` and flattens it into a dense grid of
//! [`Cell`] values addressed by absolute (row, column) indices. Both workbook
//! normalizers work against this grid rather than calamine's types, which keeps
//! them testable with hand-built grids.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;

use super::IngestError;
use crate::types::dates::{excel_serial_to_date, parse_date_token};

// ============================================================================
// Cell
// ============================================================================

/// A worksheet cell reduced to the shapes the normalizers care about.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
    /// Convert a calamine cell. Error cells read as empty.
    pub fn from_data(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Int(n) => {
                #[allow(clippy::cast_precision_loss)]
                let n = *n as f64;
                Cell::Number(n)
            }
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
                .map_or_else(|| Cell::Number(dt.as_f64()), Cell::Date),
            Data::DateTimeIso(s) => parse_date_token(s)
                .map_or_else(|| Cell::Text(s.clone()), Cell::Date),
            Data::DurationIso(s) => Cell::Text(s.clone()),
        }
    }

    /// Blank means empty or whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) | Cell::Date(_) => false,
        }
    }

    /// Display text, trimmed. Whole numbers render without a fraction.
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{n:.0}"),
            Cell::Number(n) => n.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }

    /// Integer value of a numeric cell or of text holding an integer.
    pub fn integer(&self) -> Option<i64> {
        match self {
            #[allow(clippy::cast_possible_truncation)]
            Cell::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Date value of a date cell or of text holding a readable date.
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::Text(s) => parse_date_token(s),
            Cell::Empty | Cell::Number(_) => None,
        }
    }
}

// ============================================================================
// Grid
// ============================================================================

/// Dense worksheet contents. Row and column 0 are the sheet's A1 cell even when
/// the used range starts further in.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Cell at an absolute position; out-of-range reads as empty.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row.
    pub fn col_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Trimmed header texts of one row, padded to the grid width.
    pub fn header(&self, row: usize) -> Vec<String> {
        (0..self.col_count()).map(|c| self.cell(row, c).text()).collect()
    }
}

/// Load a worksheet into a [`Grid`]. `None` reads the first sheet.
pub fn load_sheet(path: &Path, sheet: Option<&str>) -> Result<Grid, IngestError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| IngestError::Workbook {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let names = workbook.sheet_names();
    let name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| IngestError::MissingSheet {
                path: path.to_path_buf(),
                sheet: wanted.to_string(),
            })?,
        None => names.first().cloned().ok_or_else(|| IngestError::MissingSheet {
            path: path.to_path_buf(),
            sheet: "<first>".to_string(),
        })?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| IngestError::Workbook {
            path: path.to_path_buf(),
            message: format!("sheet '{name}': {e}"),
        })?;

    let (row0, col0) = range
        .start()
        .map_or((0, 0), |(r, c)| (r as usize, c as usize));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row0];
    for data_row in range.rows() {
        let mut row = vec![Cell::Empty; col0];
        row.extend(data_row.iter().map(Cell::from_data));
        rows.push(row);
    }

    tracing::debug!(
        path = %path.display(),
        sheet = %name,
        rows = rows.len(),
        "Loaded worksheet"
    );

    Ok(Grid::from_rows(rows))
}
