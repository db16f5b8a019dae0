//! Normalized timeline record and responsible-party roles

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Category, Phase};

/// One row of the normalized timeline table: a single phase of a single project.
///
/// Role-holder fields use the empty string for "absent", which is also how
/// they are written to the delimited table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPhaseRecord {
    /// Date the data snapshot was generated
    pub last_updated: NaiveDate,
    pub category: Category,
    pub department: String,
    pub location: String,
    #[serde(rename = "type")]
    pub project_type: String,
    /// Project name, the grouping key for a project's phases
    pub task: String,
    pub phase: Phase,
    pub tier: u8,
    /// Front PM, resolved by role precedence
    pub pm: String,
    pub pml: String,
    pub dm: String,
    pub pm1: String,
    pub pm2: String,
    /// Inclusive phase start
    pub start: NaiveDate,
    /// Inclusive phase finish
    pub finish: NaiveDate,
}

impl ProjectPhaseRecord {
    /// The five role columns tested by the PM filter.
    pub fn role_names(&self) -> [&str; 5] {
        [&self.pm, &self.pml, &self.dm, &self.pm1, &self.pm2]
    }
}

/// Responsible parties for one phase of one project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleHolders {
    /// Project manager lead
    pub pml: Option<String>,
    /// Design manager
    pub dm: Option<String>,
    pub pm1: Option<String>,
    pub pm2: Option<String>,
}

impl RoleHolders {
    /// Front PM by precedence PML > DM > PM1 > PM2.
    pub fn front_pm(&self) -> Option<&str> {
        [&self.pml, &self.dm, &self.pm1, &self.pm2]
            .into_iter()
            .find_map(|r| r.as_deref().filter(|s| !s.is_empty()))
    }
}
