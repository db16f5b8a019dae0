//! Project Timeline: construction project phase timelines
//!
//! Normalizes project schedules kept in spreadsheets and free text into one
//! delimited table, then answers dashboard queries against it.
//!
//! ## Architecture
//!
//! - **Ingest**: master workbook, department schedule sheets and a free-text
//!   schedule export, merged into [`ProjectPhaseRecord`]s
//! - **Table**: the normalized delimited file, written once and loaded read-only
//! - **Query**: filter → aggregate → sort → chart description
//! - **API**: JSON endpoints over the query pipeline

pub mod api;
pub mod config;
pub mod ingest;
pub mod query;
pub mod table;
pub mod types;

// Re-export configuration
pub use config::TimelineConfig;

// Re-export commonly used types
pub use types::{Category, Phase, ProjectPhaseRecord, RoleHolders};

// Re-export the table
pub use table::{TableError, TimelineTable};

// Re-export ingestion entry points
pub use ingest::{IngestError, IngestReport};

// Re-export the query pipeline
pub use query::{
    run_timeline, Chart, ColorMode, QuerySettings, Selection, SortKey, TimelineRequest,
};
