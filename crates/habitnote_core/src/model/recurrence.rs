//! Habit recurrence rules.
//!
//! # Responsibility
//! - Model habit schedules as one closed variant type.
//! - Encode editing-surface state into a rule and format rules for display.
//! - Convert rules to and from the store's `(kind, json)` columns.
//! - Answer "is this habit due on a date" and "did a gap break the streak",
//!   and fold completion dates into streak counters.
//!
//! # Invariants
//! - Weekday ids are 1..=7 with 1 = Monday; month days are 1..=31.
//! - Encoding never fails: unknown discriminators become `Daily`, an empty
//!   weekly selection becomes Monday..Friday and a missing interval becomes 1.
//! - An empty monthly selection is a validation error, not an encoder concern.

use crate::validation::ValidationError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Weekday selection substituted for an empty weekly schedule.
pub const DEFAULT_WEEKDAYS: [u8; 5] = [1, 2, 3, 4, 5];

/// Display text for payloads with a rule-like shape that matches no variant.
pub const UNKNOWN_RULE: &str = "Unknown";

const DAY_ABBREVIATIONS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// How often a habit repeats.
///
/// Serialized in the externally tagged shape used by stored payloads, e.g.
/// `"Daily"` or `{"Weekly":{"days":[1,3]}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurrenceRule {
    #[default]
    Daily,
    Weekly {
        days: BTreeSet<u8>,
    },
    Monthly {
        days: BTreeSet<u8>,
    },
    Interval {
        #[serde(rename = "days")]
        every_n_days: u32,
    },
    Custom {
        pattern: String,
    },
}

/// Errors from decoding stored recurrence columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    /// `frequency_type` column holds an unknown discriminator.
    UnknownKind(String),
    /// `frequency_data` column cannot be parsed for the given kind.
    InvalidData { kind: String, message: String },
}

impl Display for RecurrenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownKind(kind) => write!(f, "unknown recurrence kind `{kind}`"),
            Self::InvalidData { kind, message } => {
                write!(f, "invalid `{kind}` recurrence payload: {message}")
            }
        }
    }
}

impl Error for RecurrenceError {}

impl RecurrenceRule {
    /// Weekly rule on the given weekday ids.
    pub fn weekly(days: impl IntoIterator<Item = u8>) -> Self {
        Self::Weekly {
            days: days.into_iter().collect(),
        }
    }

    /// Monthly rule on the given days of month.
    pub fn monthly(days: impl IntoIterator<Item = u8>) -> Self {
        Self::Monthly {
            days: days.into_iter().collect(),
        }
    }

    /// Lowercase discriminator, matching the editing-surface vocabulary.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly { .. } => "weekly",
            Self::Monthly { .. } => "monthly",
            Self::Interval { .. } => "interval",
            Self::Custom { .. } => "custom",
        }
    }

    /// Formats the rule for list rows and detail views.
    pub fn describe(&self) -> String {
        match self {
            Self::Daily => "Daily".to_string(),
            Self::Weekly { days } => {
                if (1..=7).all(|day| days.contains(&day)) {
                    return "Every day".to_string();
                }
                let names = days
                    .iter()
                    .filter_map(|day| weekday_abbreviation(*day))
                    .collect::<Vec<_>>();
                format!("Weekly: {}", names.join(", "))
            }
            Self::Monthly { days } => {
                let label = if days.len() > 1 { "days" } else { "day" };
                let numbers = days.iter().map(u8::to_string).collect::<Vec<_>>();
                format!("Monthly on {label}: {}", numbers.join(", "))
            }
            Self::Interval { every_n_days } => {
                let suffix = if *every_n_days == 1 { "" } else { "s" };
                format!("Every {every_n_days} day{suffix}")
            }
            Self::Custom { pattern } => format!("Custom: {pattern}"),
        }
    }

    /// Splits the rule into `(frequency_type, frequency_data)` store columns.
    pub fn to_storage(&self) -> Result<(&'static str, String), RecurrenceError> {
        let data = match self {
            Self::Daily => Ok("{}".to_string()),
            Self::Weekly { days } | Self::Monthly { days } => serde_json::to_string(days),
            Self::Interval { every_n_days } => serde_json::to_string(every_n_days),
            Self::Custom { pattern } => serde_json::to_string(pattern),
        }
        .map_err(|err| RecurrenceError::InvalidData {
            kind: self.kind().to_string(),
            message: err.to_string(),
        })?;
        Ok((self.kind(), data))
    }

    /// Rebuilds a rule from `(frequency_type, frequency_data)` store columns.
    pub fn from_storage(kind: &str, data: &str) -> Result<Self, RecurrenceError> {
        let invalid = |err: serde_json::Error| RecurrenceError::InvalidData {
            kind: kind.to_string(),
            message: err.to_string(),
        };
        match kind {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly {
                days: serde_json::from_str(data).map_err(invalid)?,
            }),
            "monthly" => Ok(Self::Monthly {
                days: serde_json::from_str(data).map_err(invalid)?,
            }),
            "interval" => Ok(Self::Interval {
                every_n_days: serde_json::from_str(data).map_err(invalid)?,
            }),
            "custom" => Ok(Self::Custom {
                pattern: serde_json::from_str(data).map_err(invalid)?,
            }),
            other => Err(RecurrenceError::UnknownKind(other.to_string())),
        }
    }

    /// Returns whether the habit is due on `date`.
    ///
    /// A habit already completed on `date` is not due again.
    pub fn is_due(&self, date: NaiveDate, last_completed: Option<NaiveDate>) -> bool {
        let not_done_today = last_completed.map_or(true, |last| last < date);
        match self {
            Self::Daily => not_done_today,
            Self::Weekly { days } => days.contains(&weekday_id(date)) && not_done_today,
            Self::Monthly { days } => days.contains(&month_day(date)) && not_done_today,
            Self::Interval { every_n_days } => match last_completed {
                Some(last) => (date - last).num_days() >= i64::from(*every_n_days),
                None => true,
            },
            Self::Custom { .. } => true,
        }
    }

    /// Returns whether the gap between two completions breaks the streak.
    ///
    /// Weekly/monthly rules break when a scheduled day strictly between the
    /// two dates was skipped.
    pub fn breaks_streak(&self, previous: NaiveDate, current: NaiveDate) -> bool {
        match self {
            Self::Daily => (current - previous).num_days() > 1,
            Self::Weekly { days } => {
                any_day_between(previous, current, |date| days.contains(&weekday_id(date)))
            }
            Self::Monthly { days } => {
                any_day_between(previous, current, |date| days.contains(&month_day(date)))
            }
            Self::Interval { every_n_days } => {
                (current - previous).num_days() > i64::from(*every_n_days)
            }
            Self::Custom { .. } => false,
        }
    }

    /// Folds completion dates, oldest first, into streak counters.
    ///
    /// Repeated dates count once. The current streak is the run ending at the
    /// latest completion; it is not aged against today.
    pub fn streaks<'a>(&self, completions: impl IntoIterator<Item = &'a NaiveDate>) -> Streaks {
        let mut streaks = Streaks::default();
        for &date in completions {
            streaks.current = match streaks.last_completed {
                Some(previous) if date <= previous => continue,
                Some(previous) if !self.breaks_streak(previous, date) => streaks.current + 1,
                _ => 1,
            };
            streaks.longest = streaks.longest.max(streaks.current);
            streaks.last_completed = Some(date);
        }
        streaks
    }
}

/// Streak counters derived from a habit's completion history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Streaks {
    pub current: i32,
    pub longest: i32,
    pub last_completed: Option<NaiveDate>,
}

impl Display for RecurrenceRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Formats a foreign, possibly malformed rule payload.
///
/// Absent or null payloads read as the default `Daily`. An object that looks
/// like a tagged rule but matches no variant reads as `Unknown`.
pub fn describe_payload(payload: Option<&Value>) -> String {
    let Some(value) = payload.filter(|value| !value.is_null()) else {
        return RecurrenceRule::Daily.describe();
    };
    match serde_json::from_value::<RecurrenceRule>(value.clone()) {
        Ok(rule) => rule.describe(),
        Err(_) if value.is_object() => UNKNOWN_RULE.to_string(),
        Err(_) => RecurrenceRule::Daily.describe(),
    }
}

/// Editing-surface state for a habit schedule.
///
/// `kind` is the raw discriminator selected in the form; day selections and
/// interval/pattern inputs accumulate independently of it so switching the
/// discriminator back and forth keeps earlier input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleForm {
    pub kind: String,
    pub weekly_days: BTreeSet<u8>,
    pub monthly_days: BTreeSet<u8>,
    pub interval_days: Option<u32>,
    pub custom_pattern: String,
}

impl ScheduleForm {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Repopulates the form from a stored rule for editing.
    pub fn from_rule(rule: &RecurrenceRule) -> Self {
        let mut form = Self::new(rule.kind());
        match rule {
            RecurrenceRule::Daily => {}
            RecurrenceRule::Weekly { days } => form.weekly_days = days.clone(),
            RecurrenceRule::Monthly { days } => form.monthly_days = days.clone(),
            RecurrenceRule::Interval { every_n_days } => form.interval_days = Some(*every_n_days),
            RecurrenceRule::Custom { pattern } => form.custom_pattern = pattern.clone(),
        }
        form
    }

    /// Toggles one weekday id in the weekly selection.
    pub fn toggle_weekday(&mut self, day: u8) {
        if !self.weekly_days.remove(&day) {
            self.weekly_days.insert(day);
        }
    }

    /// Toggles one day of month in the monthly selection.
    pub fn toggle_month_day(&mut self, day: u8) {
        if !self.monthly_days.remove(&day) {
            self.monthly_days.insert(day);
        }
    }

    /// Rejects input that must block submission.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if normalized_kind(&self.kind) == "monthly" && month_days(&self.monthly_days).is_empty() {
            return Err(ValidationError::EmptyScheduleDays);
        }
        Ok(())
    }

    /// Produces exactly one rule variant. Never fails.
    pub fn encode(&self) -> RecurrenceRule {
        match normalized_kind(&self.kind).as_str() {
            "weekly" => {
                let days = self
                    .weekly_days
                    .iter()
                    .copied()
                    .filter(|day| (1..=7).contains(day))
                    .collect::<BTreeSet<_>>();
                if days.is_empty() {
                    RecurrenceRule::weekly(DEFAULT_WEEKDAYS)
                } else {
                    RecurrenceRule::Weekly { days }
                }
            }
            "monthly" => RecurrenceRule::Monthly {
                days: month_days(&self.monthly_days),
            },
            "interval" => RecurrenceRule::Interval {
                every_n_days: self.interval_days.filter(|days| *days > 0).unwrap_or(1),
            },
            "custom" => RecurrenceRule::Custom {
                pattern: self.custom_pattern.trim().to_string(),
            },
            _ => RecurrenceRule::Daily,
        }
    }
}

fn normalized_kind(kind: &str) -> String {
    kind.trim().to_ascii_lowercase()
}

fn month_days(days: &BTreeSet<u8>) -> BTreeSet<u8> {
    days.iter()
        .copied()
        .filter(|day| (1..=31).contains(day))
        .collect()
}

fn weekday_abbreviation(day: u8) -> Option<&'static str> {
    let index = usize::from(day).checked_sub(1)?;
    DAY_ABBREVIATIONS.get(index).copied()
}

fn weekday_id(date: NaiveDate) -> u8 {
    // number_from_monday is always 1..=7.
    date.weekday().number_from_monday() as u8
}

fn month_day(date: NaiveDate) -> u8 {
    date.day() as u8
}

fn any_day_between(
    previous: NaiveDate,
    current: NaiveDate,
    scheduled: impl Fn(NaiveDate) -> bool,
) -> bool {
    let mut cursor = previous;
    while let Some(next) = cursor.succ_opt() {
        if next >= current {
            return false;
        }
        if scheduled(next) {
            return true;
        }
        cursor = next;
    }
    false
}
