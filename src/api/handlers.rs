//! API route handlers
//!
//! Request handling for the dashboard endpoints:
//! - Liveness and record count
//! - Option lists and initial selections
//! - Timeline chart, project options and PM options for a selection

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::Uri;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use super::envelope::{ApiError, ApiResponse};
use crate::config::{defaults, DashboardConfig, TimelineConfig};
use crate::query::{self, ColorMode, QuerySettings, Selection, SortKey, TimelineRequest};
use crate::table::TimelineTable;
use crate::types::dates::format_table_date;
use crate::types::{Category, Phase};

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers. The table is immutable after startup.
#[derive(Clone)]
pub struct DashboardState {
    pub table: Arc<TimelineTable>,
    pub settings: Arc<QuerySettings>,
    /// Initial selections reported by `/api/v1/meta`
    pub dashboard: Arc<DashboardConfig>,
}

impl DashboardState {
    pub fn new(table: TimelineTable, config: &TimelineConfig) -> Self {
        Self {
            table: Arc::new(table),
            settings: Arc::new(QuerySettings::from_config(config)),
            dashboard: Arc::new(config.dashboard.clone()),
        }
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub records: usize,
}

/// GET /health
pub async fn health(State(state): State<DashboardState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION").to_string(),
        records: state.table.len(),
    })
}

// ============================================================================
// Meta
// ============================================================================

/// Everything the dashboard offers as a choice.
#[derive(Debug, Serialize)]
pub struct FilterOptions {
    pub categories: Vec<Category>,
    pub departments: Vec<String>,
    pub locations: Vec<String>,
    pub types: Vec<String>,
    pub tiers: Vec<u8>,
    /// Table order
    pub phases: Vec<Phase>,
    pub pms: Vec<String>,
    pub projects: Vec<String>,
    pub sort_keys: Vec<SortKey>,
    pub color_modes: Vec<ColorMode>,
    pub unknown_pm_label: &'static str,
}

/// Initial dashboard state.
#[derive(Debug, Serialize)]
pub struct DefaultView {
    pub selection: Selection,
    pub sort: SortKey,
    pub color_mode: ColorMode,
}

#[derive(Debug, Serialize)]
pub struct MetaResponse {
    /// `DD-Mon-YY`, absent for an empty table
    pub last_updated: Option<String>,
    pub records: usize,
    pub options: FilterOptions,
    pub defaults: DefaultView,
}

/// GET /api/v1/meta
pub async fn meta(State(state): State<DashboardState>) -> Response {
    let table = &state.table;
    let dash = &state.dashboard;

    let options = FilterOptions {
        categories: Category::ALL.to_vec(),
        departments: table.departments(),
        locations: defaults::LOCATIONS.map(String::from).to_vec(),
        types: defaults::TYPES.map(String::from).to_vec(),
        tiers: defaults::TIERS.to_vec(),
        phases: table.phases(),
        pms: query::pm_options(table, &Selection::default(), &state.settings.unknown_marker),
        projects: table.tasks(),
        sort_keys: SortKey::ALL.to_vec(),
        color_modes: vec![ColorMode::Phase, ColorMode::Pm],
        unknown_pm_label: query::UNKNOWN_PM_LABEL,
    };

    let initial = DefaultView {
        selection: Selection {
            departments: dash.default_departments.clone(),
            locations: dash.default_locations.clone(),
            types: dash.default_types.clone(),
            tiers: dash.default_tiers.clone(),
            ..Selection::default()
        },
        sort: state.settings.default_sort,
        color_mode: state.settings.default_color_mode,
    };

    ApiResponse::ok(
        MetaResponse {
            last_updated: table.last_updated().map(format_table_date),
            records: table.len(),
            options,
            defaults: initial,
        },
        table,
    )
}

// ============================================================================
// Timeline & option lists
// ============================================================================

/// POST /api/v1/timeline
pub async fn timeline(
    State(state): State<DashboardState>,
    payload: Result<Json<TimelineRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let chart = query::run_timeline(&state.table, &request, &state.settings, today());
    Ok(ApiResponse::ok(chart, &state.table))
}

/// POST /api/v1/options/projects
///
/// 204 when the selection leaves no rows, so the client keeps its list.
pub async fn project_options(
    State(state): State<DashboardState>,
    payload: Result<Json<Selection>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(selection) = payload?;
    let projects = query::project_options(&state.table, &selection, &state.settings.unknown_marker);
    Ok(ApiResponse::ok_or_keep(projects, &state.table))
}

/// POST /api/v1/options/pms
pub async fn pm_options(
    State(state): State<DashboardState>,
    payload: Result<Json<Selection>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(selection) = payload?;
    let pms = query::pm_options(&state.table, &selection, &state.settings.unknown_marker);
    Ok(ApiResponse::ok(pms, &state.table))
}

/// Fallback for unknown paths.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::UnknownEndpoint(uri.path().to_string())
}
