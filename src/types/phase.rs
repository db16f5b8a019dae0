//! Lifecycle phase and project category enums

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Phase
// ============================================================================

/// Named segment of a project's lifecycle.
///
/// Variant order is lifecycle order (procurement sits between detailed design
/// and construction), so the derived `Ord` can drive legends and option lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "Strategies and Plans")]
    StrategiesAndPlans,
    #[serde(rename = "Stage 0")]
    Stage0,
    #[serde(rename = "Stage 1")]
    Stage1,
    #[serde(rename = "Stage 2")]
    Stage2,
    #[serde(rename = "Stage 3")]
    Stage3,
    #[serde(rename = "Stage 4")]
    Stage4,
    Procurement,
    #[serde(rename = "Stage 5")]
    Stage5,
    #[serde(rename = "Stage 6")]
    Stage6,
}

impl Phase {
    /// All phases in lifecycle order.
    pub const ALL: [Phase; 9] = [
        Phase::StrategiesAndPlans,
        Phase::Stage0,
        Phase::Stage1,
        Phase::Stage2,
        Phase::Stage3,
        Phase::Stage4,
        Phase::Procurement,
        Phase::Stage5,
        Phase::Stage6,
    ];

    /// Label as written in the normalized table.
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::StrategiesAndPlans => "Strategies and Plans",
            Phase::Stage0 => "Stage 0",
            Phase::Stage1 => "Stage 1",
            Phase::Stage2 => "Stage 2",
            Phase::Stage3 => "Stage 3",
            Phase::Stage4 => "Stage 4",
            Phase::Procurement => "Procurement",
            Phase::Stage5 => "Stage 5",
            Phase::Stage6 => "Stage 6",
        }
    }

    /// Numbered stage lookup (`0..=6`).
    pub const fn stage(n: u8) -> Option<Phase> {
        match n {
            0 => Some(Phase::Stage0),
            1 => Some(Phase::Stage1),
            2 => Some(Phase::Stage2),
            3 => Some(Phase::Stage3),
            4 => Some(Phase::Stage4),
            5 => Some(Phase::Stage5),
            6 => Some(Phase::Stage6),
            _ => None,
        }
    }

    /// Early phases carry only two project managers in the master workbook;
    /// later phases carry the full PML / DM / PM1 / PM2 set.
    pub const fn is_early(self) -> bool {
        matches!(
            self,
            Phase::StrategiesAndPlans | Phase::Stage0 | Phase::Stage1 | Phase::Stage2
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for labels outside the canonical set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{label}'")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub label: String,
}

impl FromStr for Phase {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Phase::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownLabel {
                kind: "phase",
                label: s.to_string(),
            })
    }
}

// ============================================================================
// Category
// ============================================================================

/// Top-level classification of a timeline row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Project,
    #[serde(rename = "Strategies and Plans")]
    StrategiesAndPlans,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Project, Category::StrategiesAndPlans];

    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Project => "Project",
            Category::StrategiesAndPlans => "Strategies and Plans",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownLabel {
                kind: "category",
                label: s.to_string(),
            })
    }
}
