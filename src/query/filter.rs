//! Row filters. Each predicate is skipped when its selection is empty.

use super::{Selection, UNKNOWN_PM_LABEL};
use crate::types::ProjectPhaseRecord;

fn selected<T: PartialEq>(choices: &[T], value: &T) -> bool {
    choices.is_empty() || choices.contains(value)
}

fn selected_str(choices: &[String], value: &str) -> bool {
    choices.is_empty() || choices.iter().any(|c| c == value)
}

/// Category, department, location, type, tier and phase predicates.
pub fn base_filter<'a>(
    records: &'a [ProjectPhaseRecord],
    selection: &Selection,
) -> Vec<&'a ProjectPhaseRecord> {
    records
        .iter()
        .filter(|r| {
            selected(&selection.categories, &r.category)
                && selected_str(&selection.departments, &r.department)
                && selected_str(&selection.locations, &r.location)
                && selected_str(&selection.types, &r.project_type)
                && selected(&selection.tiers, &r.tier)
                && selected(&selection.phases, &r.phase)
        })
        .collect()
}

/// PM post-filter over all five role columns.
///
/// Selecting [`UNKNOWN_PM_LABEL`] narrows to rows whose front PM is the
/// unknown marker and ignores the rest of the PM selection.
pub fn pm_filter<'a>(
    rows: Vec<&'a ProjectPhaseRecord>,
    pms: &[String],
    unknown_marker: &str,
) -> Vec<&'a ProjectPhaseRecord> {
    if pms.is_empty() {
        return rows;
    }
    if pms.iter().any(|p| p == UNKNOWN_PM_LABEL) {
        return rows.into_iter().filter(|r| r.pm == unknown_marker).collect();
    }
    rows.into_iter()
        .filter(|r| {
            r.role_names()
                .iter()
                .any(|name| !name.is_empty() && pms.iter().any(|p| p == name))
        })
        .collect()
}

/// Keep only the picked projects.
pub fn project_filter<'a>(
    rows: Vec<&'a ProjectPhaseRecord>,
    projects: &[String],
) -> Vec<&'a ProjectPhaseRecord> {
    if projects.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|r| selected_str(projects, &r.task))
        .collect()
}

/// Base filter, then PM, then project pick.
pub fn apply<'a>(
    records: &'a [ProjectPhaseRecord],
    selection: &Selection,
    unknown_marker: &str,
) -> Vec<&'a ProjectPhaseRecord> {
    let rows = base_filter(records, selection);
    let rows = pm_filter(rows, &selection.pms, unknown_marker);
    project_filter(rows, &selection.projects)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{d, rec};
    use super::*;
    use crate::types::{Category, Phase};

    fn records() -> Vec<ProjectPhaseRecord> {
        let mut out = Vec::new();
        for (i, tier) in [1u8, 2, 3].into_iter().enumerate() {
            let mut r = rec(&format!("P{i}"), Phase::Stage3, d(2024, 1, 1), d(2024, 2, 1));
            r.tier = tier;
            out.push(r);
        }
        out[0].pm = "Anna".into();
        out[0].pml = "Anna".into();
        out[1].pm = "Bjorn".into();
        out[1].pm2 = "Anna".into();
        out[2].category = Category::StrategiesAndPlans;
        out[2].phase = Phase::StrategiesAndPlans;
        out
    }

    fn tasks(rows: &[&ProjectPhaseRecord]) -> Vec<String> {
        rows.iter().map(|r| r.task.clone()).collect()
    }

    #[test]
    fn test_empty_selection_keeps_everything() {
        let recs = records();
        assert_eq!(apply(&recs, &Selection::default(), "xx").len(), 3);
    }

    #[test]
    fn test_tier_filter() {
        let recs = records();
        let sel = Selection {
            tiers: vec![1],
            ..Selection::default()
        };
        let rows = base_filter(&recs, &sel);
        assert_eq!(rows.len(), 1);
        assert!(rows.iter().all(|r| r.tier == 1));
    }

    #[test]
    fn test_predicates_are_conjunctive() {
        let recs = records();
        let sel = Selection {
            tiers: vec![1, 3],
            phases: vec![Phase::Stage3],
            ..Selection::default()
        };
        assert_eq!(tasks(&base_filter(&recs, &sel)), ["P0"]);

        let sel = Selection {
            categories: vec![Category::StrategiesAndPlans],
            departments: vec!["FUPP".into()],
            ..Selection::default()
        };
        assert_eq!(tasks(&base_filter(&recs, &sel)), ["P2"]);
    }

    #[test]
    fn test_pm_filter_checks_every_role() {
        let recs = records();
        let rows = pm_filter(recs.iter().collect(), &["Anna".into()], "xx");
        assert_eq!(tasks(&rows), ["P0", "P1"]);
    }

    #[test]
    fn test_unknown_pm_overrides_other_pms() {
        let recs = records();
        let pms = vec!["Anna".to_string(), UNKNOWN_PM_LABEL.to_string()];
        let rows = pm_filter(recs.iter().collect(), &pms, "xx");
        assert_eq!(tasks(&rows), ["P2"]);
    }

    #[test]
    fn test_project_pick() {
        let recs = records();
        let sel = Selection {
            projects: vec!["P1".into(), "P9".into()],
            ..Selection::default()
        };
        assert_eq!(tasks(&apply(&recs, &sel, "xx")), ["P1"]);
    }
}
