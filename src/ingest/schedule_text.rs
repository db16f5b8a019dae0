//! Free-Text Schedule Matcher
//!
//! Recovers phase rows from a copy-pasted schedule export. Lines look like
//!
//! ```text
//! Pier A Extension                    01-Jan-24  30-Jun-26
//! Stage 3 Detailed design   120 d     A 01-Feb-24  30-Apr-24
//! Construction              400 d     01-May-24  31-Dec-25
//! ```
//!
//! Matching is a two-variable state machine. The project is sticky: it holds
//! until a later line starts with another known name. The phase is line-local:
//! it is classified from the line's own prefix and cleared after every line.

use chrono::NaiveDate;
use tracing::debug;

use super::{Normalized, ProjectDictionary};
use crate::types::dates::parse_date_token;
use crate::types::{Category, Phase, ProjectPhaseRecord};

/// Why a matched line produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// Fewer than two hyphenated tokens on the line
    MissingDates,
    /// A start/finish token that is not a readable date
    UnreadableDate(String),
    /// Start after finish
    Inverted,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::MissingDates => write!(f, "fewer than two date tokens"),
            DropReason::UnreadableDate(token) => write!(f, "unreadable date '{token}'"),
            DropReason::Inverted => write!(f, "start after finish"),
        }
    }
}

/// Result of feeding one line to the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Record(Box<ProjectPhaseRecord>),
    Dropped(DropReason),
    /// No project yet, no phase on the line, or the phase is not in the entry
    Ignored,
}

/// Classify a lower-cased, trimmed line by its leading phase keyword.
pub fn classify_phase(lower: &str) -> Option<(Phase, Category)> {
    if lower.starts_with("stage") {
        let mut tokens = lower.split_whitespace();
        return match (tokens.next(), tokens.next()) {
            (Some("stage"), Some(n)) => n
                .parse::<u8>()
                .ok()
                .and_then(Phase::stage)
                .map(|p| (p, Category::Project)),
            _ => None,
        };
    }
    if lower.starts_with("construction") {
        Some((Phase::Stage5, Category::Project))
    } else if lower.starts_with("procurement") {
        Some((Phase::Procurement, Category::Project))
    } else if lower.starts_with("orat") {
        Some((Phase::Stage6, Category::Project))
    } else if lower.starts_with("strategic plan") {
        Some((Phase::StrategiesAndPlans, Category::StrategiesAndPlans))
    } else {
        None
    }
}

/// Last two whitespace tokens containing `-`, skipping the literal `A`.
pub fn date_tokens(line: &str) -> Option<(&str, &str)> {
    let tokens: Vec<&str> = line
        .split_whitespace()
        .filter(|t| t.contains('-') && *t != "A")
        .collect();
    match tokens.as_slice() {
        [.., start, finish] => Some((*start, *finish)),
        _ => None,
    }
}

/// Line-by-line matcher over a project dictionary.
pub struct ScheduleTextMatcher<'d> {
    dictionary: &'d ProjectDictionary,
    /// Lower-cased names paired with the originals, longest first
    names: Vec<(String, &'d str)>,
    last_updated: NaiveDate,
    current_project: Option<&'d str>,
    current_phase: Option<(Phase, Category)>,
}

impl<'d> ScheduleTextMatcher<'d> {
    pub fn new(dictionary: &'d ProjectDictionary, last_updated: NaiveDate) -> Self {
        let names = dictionary
            .names_longest_first()
            .iter()
            .map(|n| (n.to_lowercase(), n.as_str()))
            .collect();
        Self {
            dictionary,
            names,
            last_updated,
            current_project: None,
            current_phase: None,
        }
    }

    /// Project currently in effect.
    pub fn current_project(&self) -> Option<&'d str> {
        self.current_project
    }

    pub fn process_line(&mut self, raw: &str) -> LineOutcome {
        let line = raw.trim();
        let lower = line.to_lowercase();

        if let Some((_, name)) = self.names.iter().find(|(l, _)| lower.starts_with(l.as_str())) {
            self.current_project = Some(*name);
        }
        self.current_phase = classify_phase(&lower);

        let outcome = self.emit(line);
        self.current_phase = None;
        outcome
    }

    fn emit(&self, line: &str) -> LineOutcome {
        let (Some(project), Some((phase, category))) = (self.current_project, self.current_phase)
        else {
            return LineOutcome::Ignored;
        };
        let Some(info) = self.dictionary.get(project) else {
            return LineOutcome::Ignored;
        };
        let Some(roles) = info.phases.get(&phase) else {
            return LineOutcome::Ignored;
        };

        let Some((start_tok, finish_tok)) = date_tokens(line) else {
            return LineOutcome::Dropped(DropReason::MissingDates);
        };
        let Some(start) = parse_date_token(start_tok) else {
            return LineOutcome::Dropped(DropReason::UnreadableDate(start_tok.to_string()));
        };
        let Some(finish) = parse_date_token(finish_tok) else {
            return LineOutcome::Dropped(DropReason::UnreadableDate(finish_tok.to_string()));
        };

        info.meta
            .record(self.last_updated, category, phase, roles, start, finish)
            .map_or(LineOutcome::Dropped(DropReason::Inverted), |r| {
                LineOutcome::Record(Box::new(r))
            })
    }
}

/// Run the matcher over a whole text export.
pub fn match_text(dictionary: &ProjectDictionary, text: &str, last_updated: NaiveDate) -> Normalized {
    let mut matcher = ScheduleTextMatcher::new(dictionary, last_updated);
    let mut out = Normalized::default();

    for (idx, line) in text.lines().enumerate() {
        match matcher.process_line(line) {
            LineOutcome::Record(record) => {
                debug!(line = idx + 1, task = %record.task, phase = %record.phase, "Matched schedule line");
                out.records.push(*record);
            }
            LineOutcome::Dropped(reason) => {
                debug!(line = idx + 1, project = ?matcher.current_project(), %reason, "Schedule line dropped");
                out.skipped += 1;
            }
            LineOutcome::Ignored => {}
        }
    }

    out
}
