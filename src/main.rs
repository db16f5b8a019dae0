//! Project Timeline - schedule normalization and timeline dashboard API
//!
//! # Usage
//!
//! ```bash
//! # Normalize the workbooks and the free-text export into the table
//! project-timeline ingest --last-updated 2024-05-01
//!
//! # Serve the dashboard API
//! project-timeline serve --addr 127.0.0.1:8050
//!
//! # Run one query without a server
//! echo '{"selection":{"tiers":[1]}}' | project-timeline query --request -
//! ```
//!
//! # Environment Variables
//!
//! - `TIMELINE_CONFIG`: Path to the TOML config file
//! - `TIMELINE_SERVER_ADDR`: Override the server bind address
//! - `TIMELINE_CORS_ORIGINS`: Comma-separated origins allowed by CORS
//! - `RUST_LOG`: Logging level (default: info)
//! - `LOG_FORMAT`: Set to `json` for JSON log lines

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use project_timeline::api::{create_app, DashboardState};
use project_timeline::config::{self, TimelineConfig};
use project_timeline::ingest;
use project_timeline::query::{self, TimelineRequest};
use project_timeline::table::TimelineTable;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "project-timeline")]
#[command(about = "Construction project phase timeline")]
#[command(version)]
struct CliArgs {
    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Normalize the schedule sources into the timeline table
    Ingest {
        /// Master workbook with project attributes and role holders
        #[arg(long)]
        master: Option<PathBuf>,
        /// Department schedule workbook
        #[arg(long)]
        schedule: Option<PathBuf>,
        /// Department sheet to read; repeat for several, in output order
        #[arg(long = "sheet", value_name = "NAME")]
        sheets: Vec<String>,
        /// Free-text schedule export
        #[arg(long)]
        raw: Option<PathBuf>,
        /// Output table
        #[arg(long)]
        output: Option<PathBuf>,
        /// Snapshot date stamped on every row (YYYY-MM-DD, default: today)
        #[arg(long, value_name = "YYYY-MM-DD")]
        last_updated: Option<NaiveDate>,
    },

    /// Serve the dashboard API until Ctrl+C
    Serve {
        /// Timeline table to serve
        #[arg(long)]
        data: Option<PathBuf>,
        /// Override the server address (default: "0.0.0.0:8050")
        #[arg(short, long, value_name = "HOST:PORT")]
        addr: Option<String>,
    },

    /// Answer one timeline request and print the result as JSON
    Query {
        /// Timeline table to query
        #[arg(long)]
        data: Option<PathBuf>,
        /// JSON request file, or `-` for stdin
        #[arg(long, value_name = "FILE|-")]
        request: String,
    },
}

// ============================================================================
// Logging
// ============================================================================

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

// ============================================================================
// Commands
// ============================================================================

fn run_ingest(
    mut ingest_config: config::IngestConfig,
    master: Option<PathBuf>,
    schedule: Option<PathBuf>,
    sheets: Vec<String>,
    raw: Option<PathBuf>,
    output: Option<PathBuf>,
    last_updated: Option<NaiveDate>,
) -> Result<()> {
    if let Some(p) = master {
        ingest_config.master_workbook = p;
    }
    if let Some(p) = schedule {
        ingest_config.schedule_workbook = p;
    }
    if !sheets.is_empty() {
        ingest_config.schedule_sheets = sheets;
    }
    if let Some(p) = raw {
        ingest_config.raw_schedule = p;
    }
    if let Some(p) = output {
        ingest_config.output = p;
    }
    if last_updated.is_some() {
        ingest_config.last_updated_date = last_updated;
    }

    let snapshot = ingest_config.last_updated_or(chrono::Local::now().date_naive());
    info!(
        master = %ingest_config.master_workbook.display(),
        schedule = %ingest_config.schedule_workbook.display(),
        raw = %ingest_config.raw_schedule.display(),
        last_updated = %snapshot,
        "Starting ingestion"
    );

    let report = ingest::run(&ingest_config, snapshot).context("Ingestion failed")?;
    info!(
        text_rows = report.text_rows,
        skipped = report.skipped,
        projects = report.projects,
        total = report.total_rows(),
        output = %report.output.display(),
        "✓ Ingestion complete"
    );
    Ok(())
}

async fn run_server(config: &TimelineConfig, data: Option<PathBuf>, addr: Option<String>) -> Result<()> {
    let data = data.unwrap_or_else(|| config.dashboard.data.clone());
    let server_addr = addr.unwrap_or_else(|| config.server.effective_addr());

    let table = TimelineTable::load_or_empty(&data, &config.dashboard.unknown_pm);
    info!(records = table.len(), data = %data.display(), "Timeline table ready");

    let app = create_app(DashboardState::new(table, config));

    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind to {server_addr}"))?;
    info!("✓ HTTP server listening on {}", server_addr);

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("🛑 Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
            info!("[HttpServer] Received shutdown signal");
        })
        .await;

    match result {
        Ok(()) => {
            info!("[HttpServer] Graceful shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!("[HttpServer] Server error: {}", e);
            Err(anyhow::anyhow!("HTTP server error: {}", e))
        }
    }
}

fn run_query(config: &TimelineConfig, data: Option<PathBuf>, request: &str) -> Result<()> {
    let raw = if request == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(request).with_context(|| format!("Failed to read {request}"))?
    };
    let request: TimelineRequest = serde_json::from_str(&raw).context("Malformed request")?;

    let data = data.unwrap_or_else(|| config.dashboard.data.clone());
    let table = TimelineTable::load_or_empty(&data, &config.dashboard.unknown_pm);
    let settings = query::QuerySettings::from_config(config);

    let chart = query::run_timeline(&table, &request, &settings, chrono::Local::now().date_naive());
    let output = serde_json::json!({
        "chart": chart,
        "projects": query::project_options(&table, &request.selection, &settings.unknown_marker),
        "pms": query::pm_options(&table, &request.selection, &settings.unknown_marker),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = CliArgs::parse();

    config::init(TimelineConfig::load());
    let cfg = config::get();

    match args.command {
        SubCommand::Ingest {
            master,
            schedule,
            sheets,
            raw,
            output,
            last_updated,
        } => run_ingest(cfg.ingest.clone(), master, schedule, sheets, raw, output, last_updated),
        SubCommand::Serve { data, addr } => run_server(cfg, data, addr).await,
        SubCommand::Query { data, request } => run_query(cfg, data, &request),
    }
}
