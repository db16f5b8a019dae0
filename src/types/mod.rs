//! Shared data structures for the project timeline
//!
//! This module defines the canonical vocabulary used by both pipelines:
//! - Phase / Category: closed enums with the display labels used in the table
//! - ProjectPhaseRecord: one row of the normalized timeline table
//! - RoleHolders: per-phase responsible parties and front-PM precedence
//! - dates: the table date format and the lenient date-token parser

mod phase;
mod record;
pub mod dates;

pub use phase::*;
pub use record::*;
