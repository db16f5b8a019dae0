//! Delimited-text codec for the normalized table
//!
//! Comma-separated, one header row, fixed column order. Fields containing a
//! comma, a double quote or a line break are quoted with inner quotes doubled.

use std::borrow::Cow;
use std::io::{self, Write};

use crate::types::dates::format_table_date;
use crate::types::ProjectPhaseRecord;

/// Table columns in output order.
pub const COLUMNS: [&str; 15] = [
    "Last Updated Date",
    "Category",
    "Department",
    "Location",
    "Type",
    "Task",
    "Phase",
    "Tier",
    "PM",
    "PML",
    "DM",
    "PM1",
    "PM2",
    "Start",
    "Finish",
];

/// Quote a field when it would otherwise break the row.
pub fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Split one logical CSV record respecting quoted fields.
pub fn csv_split(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Group physical lines into logical records, joining lines that sit inside
/// an open quote. Yields the 1-based line number where each record starts.
pub fn logical_records(text: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, line) in text.lines().enumerate() {
        let (start, record) = match pending.take() {
            Some((start, mut acc)) => {
                acc.push('\n');
                acc.push_str(line);
                (start, acc)
            }
            None => (idx + 1, line.to_string()),
        };
        if record.matches('"').count() % 2 == 1 {
            pending = Some((start, record));
        } else {
            out.push((start, record));
        }
    }
    // unterminated quote: keep what was read
    out.extend(pending);
    out
}

/// Write the header and every record.
pub fn write_table<W: Write>(out: &mut W, records: &[ProjectPhaseRecord]) -> io::Result<()> {
    writeln!(out, "{}", COLUMNS.join(","))?;
    for r in records {
        let tier = r.tier.to_string();
        let fields: [&str; 15] = [
            &format_table_date(r.last_updated),
            r.category.as_str(),
            &r.department,
            &r.location,
            &r.project_type,
            &r.task,
            r.phase.as_str(),
            &tier,
            &r.pm,
            &r.pml,
            &r.dm,
            &r.pm1,
            &r.pm2,
            &format_table_date(r.start),
            &format_table_date(r.finish),
        ];
        let line: Vec<Cow<'_, str>> = fields.iter().map(|f| csv_field(f)).collect();
        writeln!(out, "{}", line.join(","))?;
    }
    Ok(())
}
