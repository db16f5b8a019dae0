//! Ingestion End-to-End Tests
//!
//! Writes real `.xlsx` workbooks and a text export into a temp directory,
//! runs the full ingestion, and reads the resulting table back.

use chrono::NaiveDate;
use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::Path;

use project_timeline::config::IngestConfig;
use project_timeline::ingest::{self, IngestError};
use project_timeline::query::{self, Chart, QuerySettings, TimelineRequest};
use project_timeline::table::TimelineTable;
use project_timeline::{Category, Phase};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

const MONTHS: [&str; 4] = ["2024-01-01", "2024-02-01", "2024-03-01", "2024-04-01"];

/// Department sheet row: identity block, then an "x" in each listed month.
struct SheetRow<'a> {
    task: &'a str,
    sub_phase: &'a str,
    department: &'a str,
    responsible: &'a str,
    tier: &'a str,
    months: &'a [u16],
}

fn write_department_sheet(ws: &mut Worksheet, name: &str, rows: &[SheetRow<'_>]) {
    ws.set_name(name).unwrap();
    ws.write_string(0, 0, "Verkefnaplan").unwrap();
    let header = [
        "Verkefnaheiti",
        "Undirheiti",
        "Department",
        "Ábyrgð",
        "Location",
        "Type",
        "Tier",
        "Notes",
    ];
    for (c, h) in header.iter().enumerate() {
        ws.write_string(1, c as u16, *h).unwrap();
    }
    for (i, m) in MONTHS.iter().enumerate() {
        ws.write_string(1, 8 + i as u16, *m).unwrap();
    }
    for (i, row) in rows.iter().enumerate() {
        let r = 2 + i as u32;
        ws.write_string(r, 0, row.task).unwrap();
        ws.write_string(r, 1, row.sub_phase).unwrap();
        ws.write_string(r, 2, row.department).unwrap();
        ws.write_string(r, 3, row.responsible).unwrap();
        ws.write_string(r, 4, "Terminals").unwrap();
        ws.write_string(r, 5, "Building").unwrap();
        match row.tier.parse::<f64>() {
            Ok(n) => ws.write_number(r, 6, n).unwrap(),
            Err(_) => ws.write_string(r, 6, row.tier).unwrap(),
        };
        for m in row.months {
            ws.write_string(r, 8 + m, "x").unwrap();
        }
    }
}

fn write_schedule(path: &Path, bad_tier: bool) {
    let mut wb = Workbook::new();
    write_department_sheet(
        wb.add_worksheet(),
        "V&V",
        &[
            SheetRow {
                task: "Baggage hall",
                sub_phase: "PME & RFP",
                department: "V&V",
                responsible: "Siggi",
                tier: "1",
                months: &[1, 2],
            },
            SheetRow {
                task: "Baggage hall",
                sub_phase: "Innleiðing",
                department: "V&V",
                responsible: "Siggi",
                tier: "1",
                months: &[3],
            },
            SheetRow {
                task: "Baggage hall",
                sub_phase: "Kaffi",
                department: "V&V",
                responsible: "Siggi",
                tier: "1",
                months: &[0],
            },
        ],
    );
    write_department_sheet(
        wb.add_worksheet(),
        "SOF",
        &[SheetRow {
            task: "Fuel farm",
            sub_phase: "Skipting og hönnun á svæði",
            department: "SOF",
            responsible: "",
            tier: if bad_tier { "high" } else { "3" },
            months: &[0],
        }],
    );
    wb.save(path).unwrap();
}

fn write_master(path: &Path) {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    let top = [
        "Project Name", "Category", "Department", "Location", "Type", "Tier", "Stage 3", "", "", "",
        "Stage 5",
    ];
    let sub = ["", "", "", "", "", "", "PML", "DM", "PM1", "PM2", "PML", "DM", "PM1", "PM2"];
    for (c, h) in top.iter().enumerate().filter(|(_, h)| !h.is_empty()) {
        ws.write_string(0, c as u16, *h).unwrap();
    }
    for (c, h) in sub.iter().enumerate().filter(|(_, h)| !h.is_empty()) {
        ws.write_string(1, c as u16, *h).unwrap();
    }
    let rows: [[&str; 14]; 2] = [
        ["Pier A", "Project", "FUPP", "Terminals", "Building", "1", "Lara", "", "", "", "", "Dora", "", ""],
        ["Pier A Extension", "Project", "FUPP", "Terminals", "Building", "2", "", "", "Gunnar", "", "", "", "", ""],
    ];
    for (i, row) in rows.iter().enumerate() {
        let r = 2 + i as u32;
        for (c, v) in row.iter().enumerate().filter(|(_, v)| !v.is_empty()) {
            if c == 5 {
                ws.write_number(r, c as u16, v.parse::<f64>().unwrap()).unwrap();
            } else {
                ws.write_string(r, c as u16, *v).unwrap();
            }
        }
    }
    wb.save(path).unwrap();
}

const RAW: &str = "\
Pier A Extension            01-Jan-24  30-Jun-26
Stage 3 Detailed design   120 d   A 01-Feb-24  30-Apr-24
Pier A                        01-Jan-24  31-Dec-25
Stage 3 Design   90 d   01-Mar-24  31-May-24
Construction   400 d   01-Jun-24  31-Dec-25
Stage 4 Review   10 d   xx-yy  01-Jan-24
Unrelated line with 01-Jan-24 and 02-Jan-24
";

fn setup(dir: &Path, bad_tier: bool) -> IngestConfig {
    let config = IngestConfig {
        master_workbook: dir.join("Projects_info.xlsx"),
        schedule_workbook: dir.join("schedule.xlsx"),
        raw_schedule: dir.join("raw_data.txt"),
        output: dir.join("formatted_data.csv"),
        ..IngestConfig::default()
    };
    write_schedule(&config.schedule_workbook, bad_tier);
    write_master(&config.master_workbook);
    std::fs::write(&config.raw_schedule, RAW).unwrap();
    config
}

#[test]
fn test_full_ingestion_writes_table() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), false);

    let report = ingest::run(&config, d(2024, 5, 1)).unwrap();
    assert_eq!(
        report.sheet_rows,
        vec![("V&V".to_string(), 2), ("SOF".to_string(), 1)]
    );
    assert_eq!(report.text_rows, 3);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.projects, 2);
    assert_eq!(report.total_rows(), 6);

    let text = std::fs::read_to_string(&config.output).unwrap();
    assert!(text.starts_with(
        "Last Updated Date,Category,Department,Location,Type,Task,Phase,Tier,PM,PML,DM,PM1,PM2,Start,Finish\n"
    ));
    assert!(text.contains("01-May-24,Project,V&V,Terminals,Building,Baggage hall,Procurement,1,Siggi,,,Siggi,,01-Feb-24,01-Mar-24"));

    let table = TimelineTable::load(&config.output, "xx").unwrap();
    assert_eq!(table.len(), 6);
    let tasks: Vec<&str> = table.records().iter().map(|r| r.task.as_str()).collect();
    assert_eq!(
        tasks,
        ["Baggage hall", "Baggage hall", "Fuel farm", "Pier A Extension", "Pier A", "Pier A"]
    );
}

#[test]
fn test_sheet_rows_become_month_spans() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), false);
    let (records, _) = ingest::collect(&config, d(2024, 5, 1)).unwrap();

    let stage5 = &records[1];
    assert_eq!(stage5.phase, Phase::Stage5);
    assert_eq!((stage5.start, stage5.finish), (d(2024, 4, 1), d(2024, 4, 1)));

    let fuel = &records[2];
    assert_eq!(fuel.phase, Phase::Stage4);
    assert_eq!(fuel.tier, 3);
    assert_eq!(fuel.pm, "");
}

#[test]
fn test_text_rows_take_roles_from_master() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), false);
    let (records, _) = ingest::collect(&config, d(2024, 5, 1)).unwrap();
    let text_rows = &records[3..];

    assert_eq!(text_rows[0].task, "Pier A Extension");
    assert_eq!(text_rows[0].phase, Phase::Stage3);
    assert_eq!(text_rows[0].pm, "Gunnar");
    assert_eq!(text_rows[0].tier, 2);
    assert_eq!(text_rows[0].start, d(2024, 2, 1));

    assert_eq!(text_rows[1].pm, "Lara");
    assert_eq!(text_rows[2].phase, Phase::Stage5);
    assert_eq!(text_rows[2].pm, "Dora");
    assert_eq!(text_rows[2].category, Category::Project);
    assert!(records.iter().all(|r| r.start <= r.finish));
}

#[test]
fn test_bad_tier_aborts_ingestion() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), true);

    let err = ingest::run(&config, d(2024, 5, 1)).unwrap_err();
    assert!(matches!(err, IngestError::InvalidTier { .. }), "got {err}");
    assert!(!config.output.exists());
}

#[test]
fn test_missing_sheet_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = setup(dir.path(), false);
    config.schedule_sheets = vec!["FUPP".to_string()];

    let err = ingest::run(&config, d(2024, 5, 1)).unwrap_err();
    assert!(matches!(err, IngestError::MissingSheet { .. }), "got {err}");
}

#[test]
fn test_ingested_table_answers_queries() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path(), false);
    ingest::run(&config, d(2024, 5, 1)).unwrap();

    let table = TimelineTable::load(&config.output, "xx").unwrap();
    let chart = query::run_timeline(
        &table,
        &TimelineRequest::default(),
        &QuerySettings::default(),
        d(2024, 5, 1),
    );
    let Chart::Timeline(c) = chart else {
        panic!("expected a timeline");
    };
    assert_eq!(c.bars.len(), 6);
    // Fuel farm had no responsible person
    assert!(c.bars.iter().any(|b| b.task == "Fuel farm" && b.pm == "xx"));
}
