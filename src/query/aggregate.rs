//! Per-task aggregates attached to every row of the task.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::types::{Phase, ProjectPhaseRecord};

/// A filtered row plus the aggregates of its task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineRow<'a> {
    pub record: &'a ProjectPhaseRecord,
    /// Earliest start over the task's rows
    pub project_start: NaiveDate,
    /// Latest finish over the task's rows
    pub project_finish: NaiveDate,
    pub stage_5_start: Option<NaiveDate>,
    pub procurement_start: Option<NaiveDate>,
    pub stage_3_start: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy)]
struct TaskSpan {
    start: NaiveDate,
    finish: NaiveDate,
    stage_5_start: Option<NaiveDate>,
    procurement_start: Option<NaiveDate>,
    stage_3_start: Option<NaiveDate>,
}

fn earliest(current: Option<NaiveDate>, candidate: NaiveDate) -> Option<NaiveDate> {
    Some(current.map_or(candidate, |c| c.min(candidate)))
}

/// Attach task aggregates to each row. Row order is preserved.
pub fn aggregate<'a>(rows: Vec<&'a ProjectPhaseRecord>) -> Vec<TimelineRow<'a>> {
    let mut spans: HashMap<&str, TaskSpan> = HashMap::new();

    for r in &rows {
        let span = spans.entry(r.task.as_str()).or_insert(TaskSpan {
            start: r.start,
            finish: r.finish,
            stage_5_start: None,
            procurement_start: None,
            stage_3_start: None,
        });
        span.start = span.start.min(r.start);
        span.finish = span.finish.max(r.finish);
        match r.phase {
            Phase::Stage5 => span.stage_5_start = earliest(span.stage_5_start, r.start),
            Phase::Procurement => span.procurement_start = earliest(span.procurement_start, r.start),
            Phase::Stage3 => span.stage_3_start = earliest(span.stage_3_start, r.start),
            _ => {}
        }
    }

    rows.into_iter()
        .filter_map(|record| {
            spans.get(record.task.as_str()).map(|span| TimelineRow {
                record,
                project_start: span.start,
                project_finish: span.finish,
                stage_5_start: span.stage_5_start,
                procurement_start: span.procurement_start,
                stage_3_start: span.stage_3_start,
            })
        })
        .collect()
}
