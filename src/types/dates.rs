//! Date formats shared by ingestion output and table loading.
//!
//! The normalized table writes every date as `DD-Mon-YY`. Inputs are messier:
//! spreadsheet date cells arrive as Excel serial numbers, month headers and
//! copy-pasted schedule lines carry whatever format the exporting tool chose.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

/// Output format for all dates in the normalized table (`05-Jan-24`).
pub const TABLE_DATE_FORMAT: &str = "%d-%b-%y";

/// Date-only formats tried in order by [`parse_date_token`].
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    TABLE_DATE_FORMAT,
    "%d-%b-%Y",
    "%d-%m-%Y",
    "%d-%m-%y",
    "%d.%m.%Y",
    "%d/%m/%Y",
];

/// Date-time formats; only the date part is kept.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// `%Y` also accepts one to three digits, so `12-03-25` would otherwise read
/// as year 12 under the ISO format.
const MIN_YEAR: i32 = 1900;

/// Format a date the way the normalized table stores it.
pub fn format_table_date(date: NaiveDate) -> String {
    date.format(TABLE_DATE_FORMAT).to_string()
}

/// Parse a date token in any of the accepted formats.
///
/// Returns `None` for anything that is not a readable calendar date; callers
/// treat that as an unresolvable start/finish.
pub fn parse_date_token(token: &str) -> Option<NaiveDate> {
    let token = token.trim().trim_matches('"');
    if token.is_empty() {
        return None;
    }

    let plausible = |d: &NaiveDate| d.year() >= MIN_YEAR;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok().filter(plausible))
        .or_else(|| {
            DATETIME_FORMATS.iter().find_map(|fmt| {
                NaiveDateTime::parse_from_str(token, fmt)
                    .ok()
                    .map(|dt| dt.date())
                    .filter(plausible)
            })
        })
}

/// Convert an Excel serial day number (1900 date system) to a calendar date.
///
/// Serial 1 is 1900-01-01; the epoch is shifted to 1899-12-30 to absorb the
/// phantom 1900-02-29 that Excel counts.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    #[allow(clippy::cast_possible_truncation)]
    let days = serial.floor() as i64;
    epoch.checked_add_signed(Duration::try_days(days)?)
}
