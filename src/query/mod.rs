//! Query Pipeline: filter → aggregate → sort → chart
//!
//! Every dashboard interaction re-runs the whole pipeline against the
//! immutable [`TimelineTable`]. Nothing is cached between requests; the same
//! request against the same table always yields the same rows in the same
//! order.
//!
//! The HTTP handlers and the `query` CLI command are thin wrappers around
//! [`run_timeline`], [`project_options`] and [`pm_options`].

pub mod aggregate;
pub mod chart;
pub mod filter;
pub mod sort;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::TimelineConfig;
use crate::table::{sorted_unique, TimelineTable};
use crate::types::{Category, Phase, ProjectPhaseRecord};

pub use aggregate::{aggregate, TimelineRow};
pub use chart::{Bar, Chart, LegendEntry, Palette, TimelineChart};

/// PM option that selects rows with no responsible person.
pub const UNKNOWN_PM_LABEL: &str = "Unknown PM";

// ============================================================================
// Request types
// ============================================================================

/// Multi-select filter state. An empty list means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    pub categories: Vec<Category>,
    pub departments: Vec<String>,
    pub locations: Vec<String>,
    pub types: Vec<String>,
    pub tiers: Vec<u8>,
    pub phases: Vec<Phase>,
    pub pms: Vec<String>,
    /// Task names picked from the project option list
    pub projects: Vec<String>,
}

/// Row ordering. Always descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "Project_Start")]
    ProjectStart,
    #[serde(rename = "Project_Finish")]
    ProjectFinish,
    #[serde(rename = "Stage_3_Start")]
    Stage3Start,
    #[serde(rename = "Procurement_Start")]
    ProcurementStart,
    #[serde(rename = "Stage_5_Start")]
    Stage5Start,
    #[serde(rename = "PM")]
    Pm,
    Task,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        SortKey::ProjectStart,
        SortKey::ProjectFinish,
        SortKey::Stage3Start,
        SortKey::ProcurementStart,
        SortKey::Stage5Start,
        SortKey::Pm,
        SortKey::Task,
    ];
}

/// Bar coloring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorMode {
    #[default]
    Phase,
    #[serde(rename = "PM")]
    Pm,
}

/// One chart request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineRequest {
    #[serde(default)]
    pub selection: Selection,
    /// Falls back to the configured default
    #[serde(default)]
    pub sort: Option<SortKey>,
    /// Falls back to the configured default
    #[serde(default)]
    pub color_mode: Option<ColorMode>,
    /// Range slider toggle presses; odd shows the slider
    #[serde(default)]
    pub slider_clicks: u32,
}

// ============================================================================
// Settings
// ============================================================================

/// Configuration the pipeline needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySettings {
    pub unknown_marker: String,
    pub default_sort: SortKey,
    pub default_color_mode: ColorMode,
    pub min_chart_height_px: u32,
    pub row_height_px: u32,
    pub palette: Palette,
}

impl QuerySettings {
    pub fn from_config(config: &TimelineConfig) -> Self {
        let d = &config.dashboard;
        Self {
            unknown_marker: d.unknown_pm.clone(),
            default_sort: d.default_sort,
            default_color_mode: d.default_color_mode,
            min_chart_height_px: d.min_chart_height_px,
            row_height_px: d.row_height_px,
            palette: Palette::from_colors(&config.colors),
        }
    }

    /// `max(min height, projects × row height)`.
    pub fn chart_height(&self, project_count: usize) -> u32 {
        let rows = u32::try_from(project_count).unwrap_or(u32::MAX);
        self.min_chart_height_px
            .max(rows.saturating_mul(self.row_height_px))
    }
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self::from_config(&TimelineConfig::default())
    }
}

// ============================================================================
// Pipeline entry points
// ============================================================================

/// Filter, aggregate and sort.
pub fn prepare_rows<'a>(
    records: &'a [ProjectPhaseRecord],
    selection: &Selection,
    key: SortKey,
    unknown_marker: &str,
) -> Vec<TimelineRow<'a>> {
    let filtered = filter::apply(records, selection, unknown_marker);
    let mut rows = aggregate(filtered);
    sort::sort_rows(&mut rows, key);
    rows
}

/// Full chart description for one request.
pub fn run_timeline(
    table: &TimelineTable,
    request: &TimelineRequest,
    settings: &QuerySettings,
    today: NaiveDate,
) -> Chart {
    let key = request.sort.unwrap_or(settings.default_sort);
    let mode = request.color_mode.unwrap_or(settings.default_color_mode);

    let rows = prepare_rows(table.records(), &request.selection, key, &settings.unknown_marker);
    if rows.is_empty() {
        return Chart::no_data();
    }

    let project_count = project_options(table, &request.selection, &settings.unknown_marker)
        .map_or(0, |o| o.len());

    chart::build(
        &rows,
        mode,
        &settings.palette,
        today,
        request.slider_clicks,
        settings.chart_height(project_count),
    )
}

/// Sorted unique tasks after every filter except the project pick itself.
///
/// `None` when the filters leave nothing, meaning the option list should not
/// be updated.
pub fn project_options(
    table: &TimelineTable,
    selection: &Selection,
    unknown_marker: &str,
) -> Option<Vec<String>> {
    let rows = filter::base_filter(table.records(), selection);
    let rows = filter::pm_filter(rows, &selection.pms, unknown_marker);
    if rows.is_empty() {
        return None;
    }
    Some(sorted_unique(rows.iter().map(|r| r.task.as_str())))
}

/// Sorted unique front PMs after the base filters; the PM pick is ignored.
///
/// The unknown marker is listed as [`UNKNOWN_PM_LABEL`], so picking it from
/// the list takes the unknown-only path in [`filter::pm_filter`].
pub fn pm_options(
    table: &TimelineTable,
    selection: &Selection,
    unknown_marker: &str,
) -> Vec<String> {
    let rows = filter::base_filter(table.records(), selection);
    sorted_unique(rows.iter().map(|r| pm_option_label(&r.pm, unknown_marker)))
}

fn pm_option_label<'a>(pm: &'a str, unknown_marker: &str) -> &'a str {
    if pm == unknown_marker {
        UNKNOWN_PM_LABEL
    } else {
        pm
    }
}
