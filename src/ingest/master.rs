//! Project Master Dictionary
//!
//! The master workbook carries two header rows: merged group labels on top
//! (phase names over their role columns) and role names underneath. Headers
//! are flattened to `"<group> <role>"`; identity columns have no sub-header and
//! keep just their top label.

use std::collections::{BTreeMap, HashMap};

use super::workbook::Grid;
use super::{parse_tier, IngestError, ProjectMeta};
use crate::types::{Phase, RoleHolders};

pub const COL_PROJECT_NAME: &str = "Project Name";
pub const COL_DEPARTMENT: &str = "Department";
pub const COL_LOCATION: &str = "Location";
pub const COL_TYPE: &str = "Type";
pub const COL_TIER: &str = "Tier";

/// Zero-based rows of the two header tiers.
const TOP_HEADER_ROW: usize = 0;
const SUB_HEADER_ROW: usize = 1;

/// One project's master entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectInfo {
    pub meta: ProjectMeta,
    /// Role-holders for every lifecycle phase
    pub phases: BTreeMap<Phase, RoleHolders>,
}

/// Known projects keyed by name, with the longest-first match order.
#[derive(Debug, Clone, Default)]
pub struct ProjectDictionary {
    projects: HashMap<String, ProjectInfo>,
    names_longest_first: Vec<String>,
}

impl ProjectDictionary {
    /// Build the dictionary from a master worksheet grid.
    pub fn from_grid(grid: &Grid, source_name: &str) -> Result<Self, IngestError> {
        let header = flatten_header(grid, TOP_HEADER_ROW, SUB_HEADER_ROW);
        let column = |name: &str| header.iter().position(|h| h == name);
        let require = |name: &str| {
            column(name).ok_or_else(|| IngestError::MissingColumn {
                source_name: source_name.to_string(),
                column: name.to_string(),
            })
        };

        let name_col = require(COL_PROJECT_NAME)?;
        let department_col = require(COL_DEPARTMENT)?;
        let location_col = require(COL_LOCATION)?;
        let type_col = require(COL_TYPE)?;
        let tier_col = require(COL_TIER)?;

        // Role columns per phase; a missing column means no holder.
        let role_cols: Vec<(Phase, [Option<usize>; 4])> = Phase::ALL
            .into_iter()
            .map(|phase| {
                let col = |role: &str| column(&format!("{phase} {role}"));
                let cols = if phase.is_early() {
                    [None, None, col("PM"), col("PM1")]
                } else {
                    [col("PML"), col("DM"), col("PM1"), col("PM2")]
                };
                (phase, cols)
            })
            .collect();

        let mut dict = Self::default();

        for r in (SUB_HEADER_ROW + 1)..grid.row_count() {
            let name = grid.cell(r, name_col).text();
            if name.is_empty() {
                continue;
            }
            let tier = parse_tier(grid.cell(r, tier_col), source_name, r + 1)?;

            let holder = |c: Option<usize>| {
                c.map(|c| grid.cell(r, c).text())
                    .filter(|s| !s.is_empty())
            };
            let phases = role_cols
                .iter()
                .map(|(phase, [pml, dm, pm1, pm2])| {
                    let roles = RoleHolders {
                        pml: holder(*pml),
                        dm: holder(*dm),
                        pm1: holder(*pm1),
                        pm2: holder(*pm2),
                    };
                    (*phase, roles)
                })
                .collect();

            let info = ProjectInfo {
                meta: ProjectMeta {
                    task: name.clone(),
                    department: grid.cell(r, department_col).text(),
                    location: grid.cell(r, location_col).text(),
                    project_type: grid.cell(r, type_col).text(),
                    tier,
                },
                phases,
            };
            dict.insert(name, info);
        }

        Ok(dict)
    }

    /// Add or replace a project. A repeated name keeps the later entry.
    pub fn insert(&mut self, name: String, info: ProjectInfo) {
        if self.projects.insert(name.clone(), info).is_none() {
            self.names_longest_first.push(name);
            // stable: equal lengths keep sheet order
            self.names_longest_first
                .sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
        }
    }

    pub fn get(&self, name: &str) -> Option<&ProjectInfo> {
        self.projects.get(name)
    }

    /// Project names, longest first.
    pub fn names_longest_first(&self) -> &[String] {
        &self.names_longest_first
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

/// Join the two header rows into flat column names.
///
/// Blank top cells inherit the nearest non-blank top label to their left, but
/// only when that label names a phase: merged phase groups span their role
/// columns, identity columns never do.
pub fn flatten_header(grid: &Grid, top_row: usize, sub_row: usize) -> Vec<String> {
    let mut group: Option<String> = None;
    (0..grid.col_count())
        .map(|c| {
            let top = grid.cell(top_row, c).text();
            let top = if top.is_empty() {
                group.clone().unwrap_or_default()
            } else {
                group = top.parse::<Phase>().is_ok().then(|| top.clone());
                top
            };
            let sub = grid.cell(sub_row, c).text();
            format!("{top} {sub}").trim().to_string()
        })
        .collect()
}
