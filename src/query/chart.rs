//! Chart description handed to the renderer.
//!
//! The description is renderer-agnostic: one bar per phase row, the task axis
//! order, the legend, and the layout flags. Colors are resolved here so the
//! client never needs its own palette.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::sort::task_order;
use super::{ColorMode, TimelineRow};
use crate::config::ColorsConfig;
use crate::types::Phase;

/// Title of the placeholder figure.
pub const NO_DATA_TITLE: &str = "No Data to Display";

// ============================================================================
// Palette
// ============================================================================

/// Phase and PM color tables with a shared fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    fallback: String,
    phase: BTreeMap<String, String>,
    pm: BTreeMap<String, String>,
}

impl Palette {
    pub fn from_colors(colors: &ColorsConfig) -> Self {
        Self {
            fallback: colors.fallback.clone(),
            phase: colors.phase.clone(),
            pm: colors.pm.clone(),
        }
    }

    pub fn phase_color(&self, phase: Phase) -> &str {
        self.phase
            .get(phase.as_str())
            .map_or(self.fallback.as_str(), String::as_str)
    }

    /// PMs without an entry get the neutral fallback.
    pub fn pm_color(&self, pm: &str) -> &str {
        self.pm.get(pm).map_or(self.fallback.as_str(), String::as_str)
    }

    /// Phase legend: reverse lifecycle order, colored phases only.
    fn phase_legend(&self) -> Vec<LegendEntry> {
        Phase::ALL
            .iter()
            .rev()
            .filter_map(|p| {
                self.phase.get(p.as_str()).map(|color| LegendEntry {
                    label: p.as_str().to_string(),
                    color: color.clone(),
                })
            })
            .collect()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_colors(&ColorsConfig::default())
    }
}

// ============================================================================
// Chart description
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chart {
    Timeline(TimelineChart),
    NoData { title: String },
}

impl Chart {
    pub fn no_data() -> Self {
        Chart::NoData {
            title: NO_DATA_TITLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineChart {
    pub color_mode: ColorMode,
    pub bars: Vec<Bar>,
    /// Category axis order, bottom to top
    pub task_order: Vec<String>,
    pub legend: Vec<LegendEntry>,
    /// Vertical "today" marker
    pub today: NaiveDate,
    pub range_slider: bool,
    pub height_px: u32,
}

/// One phase row drawn as a horizontal bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bar {
    pub task: String,
    pub phase: Phase,
    pub start: NaiveDate,
    pub finish: NaiveDate,
    /// Legend entry this bar belongs to
    pub color_key: String,
    pub color: String,
    pub hover_name: String,
    pub pm: String,
    pub department: String,
    pub location: String,
    #[serde(rename = "type")]
    pub project_type: String,
    pub tier: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

fn bar(row: &TimelineRow<'_>, mode: ColorMode, palette: &Palette) -> Bar {
    let r = row.record;
    let (color_key, color, hover_name) = match mode {
        ColorMode::Phase => (
            r.phase.as_str().to_string(),
            palette.phase_color(r.phase),
            r.pm.clone(),
        ),
        ColorMode::Pm => (
            r.pm.clone(),
            palette.pm_color(&r.pm),
            r.phase.as_str().to_string(),
        ),
    };
    Bar {
        task: r.task.clone(),
        phase: r.phase,
        start: r.start,
        finish: r.finish,
        color_key,
        color: color.to_string(),
        hover_name,
        pm: r.pm.clone(),
        department: r.department.clone(),
        location: r.location.clone(),
        project_type: r.project_type.clone(),
        tier: r.tier,
    }
}

/// Build the figure for already sorted rows.
///
/// Empty input yields the placeholder.
pub fn build(
    rows: &[TimelineRow<'_>],
    mode: ColorMode,
    palette: &Palette,
    today: NaiveDate,
    slider_clicks: u32,
    height_px: u32,
) -> Chart {
    if rows.is_empty() {
        return Chart::no_data();
    }

    let bars: Vec<Bar> = rows.iter().map(|row| bar(row, mode, palette)).collect();

    let legend = match mode {
        ColorMode::Phase => palette.phase_legend(),
        ColorMode::Pm => {
            let mut pms: Vec<&str> = rows.iter().map(|r| r.record.pm.as_str()).collect();
            pms.sort_unstable();
            pms.dedup();
            pms.into_iter()
                .map(|pm| LegendEntry {
                    label: pm.to_string(),
                    color: palette.pm_color(pm).to_string(),
                })
                .collect()
        }
    };

    Chart::Timeline(TimelineChart {
        color_mode: mode,
        bars,
        task_order: task_order(rows),
        legend,
        today,
        range_slider: slider_clicks % 2 == 1,
        height_px,
    })
}
