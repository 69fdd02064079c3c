//! Habit model.
//!
//! # Invariants
//! - `priority` is one of 1 (high), 2, 3 (low).
//! - `current_streak`, `longest_streak` and `last_completed` are derived by
//!   the store from recorded completions and read-only here.

use crate::model::recurrence::RecurrenceRule;
use crate::model::tag::normalize_tag_names;
use crate::validation::{check_color, require_name, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable habit identifier.
pub type HabitId = Uuid;

/// Habit priority; serialized as its integer level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn level(self) -> i64 {
        match self {
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }
}

impl TryFrom<i64> for Priority {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::High),
            2 => Ok(Self::Medium),
            3 => Ok(Self::Low),
            other => Err(ValidationError::InvalidPriority(other)),
        }
    }
}

impl From<Priority> for i64 {
    fn from(value: Priority) -> Self {
        value.level()
    }
}

/// Recurring goal with a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub frequency: RecurrenceRule,
    pub target_value: Option<f64>,
    pub target_unit: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub priority: Priority,
    pub is_active: bool,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// `HH:MM` local time.
    pub reminder_time: Option<String>,
    pub current_streak: i32,
    pub longest_streak: i32,
    /// Latest recorded completion day.
    pub last_completed: Option<NaiveDate>,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds.
    pub updated_at: i64,
}

/// Fields for habit create/update commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitDraft {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub frequency: RecurrenceRule,
    pub target_value: Option<f64>,
    pub target_unit: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub priority: Priority,
    pub is_active: bool,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub reminder_time: Option<String>,
}

impl HabitDraft {
    /// Creates an active daily habit starting on `start_date`.
    pub fn new(name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            description: None,
            category: None,
            tags: Vec::new(),
            frequency: RecurrenceRule::Daily,
            target_value: None,
            target_unit: None,
            color: None,
            icon: None,
            priority: Priority::default(),
            is_active: true,
            start_date,
            end_date: None,
            reminder_time: None,
        }
    }

    /// Trims the name, dedupes tags, and rejects blank names, bad colors and
    /// monthly rules without days.
    pub fn normalized(&self) -> Result<Self, ValidationError> {
        let name = require_name(&self.name, "habit name")?;
        check_color(self.color.as_deref())?;
        if let RecurrenceRule::Monthly { days } = &self.frequency {
            if days.is_empty() {
                return Err(ValidationError::EmptyScheduleDays);
            }
        }
        Ok(Self {
            name,
            tags: normalize_tag_names(&self.tags),
            ..self.clone()
        })
    }

    /// Builds a draft that rewrites `habit` unchanged.
    pub fn from_habit(habit: &Habit) -> Self {
        Self {
            name: habit.name.clone(),
            description: habit.description.clone(),
            category: habit.category.clone(),
            tags: habit.tags.clone(),
            frequency: habit.frequency.clone(),
            target_value: habit.target_value,
            target_unit: habit.target_unit.clone(),
            color: habit.color.clone(),
            icon: habit.icon.clone(),
            priority: habit.priority,
            is_active: habit.is_active,
            start_date: habit.start_date,
            end_date: habit.end_date,
            reminder_time: habit.reminder_time.clone(),
        }
    }
}

impl Habit {
    /// Returns whether the habit runs on `date` at all (active and in range).
    pub fn is_scheduled_window(&self, date: NaiveDate) -> bool {
        self.is_active && self.start_date <= date && self.end_date.map_or(true, |end| date <= end)
    }

    /// Returns whether the habit still needs doing on `date`.
    ///
    /// Completions recorded after `date` are ignored.
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        let last_completed = self.last_completed.filter(|last| *last <= date);
        self.is_scheduled_window(date) && self.frequency.is_due(date, last_completed)
    }

    /// Current streak as seen on `date`: zero once a scheduled day between
    /// the last completion and `date` went undone.
    pub fn streak_on(&self, date: NaiveDate) -> i32 {
        match self.last_completed {
            Some(last) if last < date && self.frequency.breaks_streak(last, date) => 0,
            _ => self.current_streak,
        }
    }
}
