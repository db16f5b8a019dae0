//! Descending row order and the task axis derived from it.

use std::cmp::Ordering;

use chrono::NaiveDate;

use super::{SortKey, TimelineRow};

/// Descending, with absent dates ahead of every present one.
fn descending_absent_first(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => b.cmp(&a),
    }
}

fn compare(a: &TimelineRow<'_>, b: &TimelineRow<'_>, key: SortKey) -> Ordering {
    match key {
        SortKey::ProjectStart => b.project_start.cmp(&a.project_start),
        SortKey::ProjectFinish => b.project_finish.cmp(&a.project_finish),
        SortKey::Stage3Start => descending_absent_first(a.stage_3_start, b.stage_3_start),
        SortKey::ProcurementStart => {
            descending_absent_first(a.procurement_start, b.procurement_start)
        }
        SortKey::Stage5Start => descending_absent_first(a.stage_5_start, b.stage_5_start),
        SortKey::Pm => b.record.pm.cmp(&a.record.pm),
        SortKey::Task => b.record.task.cmp(&a.record.task),
    }
}

/// Stable sort; ties keep table order.
pub fn sort_rows(rows: &mut [TimelineRow<'_>], key: SortKey) {
    rows.sort_by(|a, b| compare(a, b, key));
}

/// Unique tasks in row order, reversed. The chart's category axis runs
/// bottom-up, so the first sorted task ends up on top.
pub fn task_order(rows: &[TimelineRow<'_>]) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    for row in rows {
        if !order.iter().any(|t| *t == row.record.task) {
            order.push(row.record.task.clone());
        }
    }
    order.reverse();
    order
}
