//! Habit persistence.
//!
//! # Invariants
//! - The recurrence rule is stored as `(frequency_type, frequency_data)`.
//! - A malformed stored rule reads back as `Daily` with a warning, so one
//!   bad row never hides the whole list.
//! - Dates are ISO `YYYY-MM-DD` text.
//! - A habit has at most one completion per day; streak columns are
//!   recomputed from the whole completion history on every completion.

use super::notes::search_needle;
use super::tags::TagLinks;
use super::{parse_uuid, StoreError, StoreResult};
use crate::model::document::DocumentFlag;
use crate::model::habit::{Habit, HabitDraft, HabitId, Priority};
use crate::model::recurrence::RecurrenceRule;
use chrono::NaiveDate;
use log::{info, warn};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";
const HABIT_COLUMNS: &str = "id, name, description, category, frequency_type, frequency_data, \
     target_value, target_unit, color, icon, priority, is_active, start_date, end_date, \
     reminder_time, current_streak, longest_streak, last_completed, created_at, updated_at";

/// Repository interface for habits.
pub trait HabitRepository {
    fn list_habits(&self) -> StoreResult<Vec<Habit>>;
    /// Case-insensitive substring match on name or description.
    fn search_habits(&self, query: &str) -> StoreResult<Vec<Habit>>;
    fn get_habit(&self, id: HabitId) -> StoreResult<Option<Habit>>;
    fn create_habit(&self, draft: &HabitDraft, now_ms: i64) -> StoreResult<HabitId>;
    fn update_habit(&self, id: HabitId, draft: &HabitDraft, now_ms: i64) -> StoreResult<()>;
    fn delete_habit(&self, id: HabitId) -> StoreResult<()>;
    fn set_habit_flag(
        &self,
        id: HabitId,
        flag: DocumentFlag,
        value: bool,
        now_ms: i64,
    ) -> StoreResult<()>;
    /// Records `date` as done and refreshes the streak columns.
    fn complete_habit(&self, id: HabitId, date: NaiveDate, now_ms: i64) -> StoreResult<()>;
    /// Completion days, oldest first.
    fn list_completions(&self, id: HabitId) -> StoreResult<Vec<NaiveDate>>;
}

/// SQLite-backed habit repository.
pub struct SqliteHabitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHabitRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_habits(&self, filter: &str, bind_values: Vec<Value>) -> StoreResult<Vec<Habit>> {
        let sql = format!(
            "SELECT {HABIT_COLUMNS} FROM habits {filter} ORDER BY updated_at DESC, rowid ASC;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut habits = Vec::new();
        while let Some(row) = rows.next()? {
            habits.push(habit_from_row(self.conn, row)?);
        }
        Ok(habits)
    }

    /// Binds the draft as `?1..=?16` in column order.
    fn write_row(
        &self,
        tx: &Connection,
        sql: &str,
        id_text: &str,
        draft: &HabitDraft,
        now_ms: i64,
    ) -> StoreResult<usize> {
        let (frequency_type, frequency_data) = draft
            .frequency
            .to_storage()
            .map_err(|err| StoreError::InvalidData(err.to_string()))?;
        let changed = tx.execute(
            sql,
            params![
                id_text,
                draft.name,
                draft.description,
                draft.category,
                frequency_type,
                frequency_data,
                draft.target_value,
                draft.target_unit,
                draft.color,
                draft.icon,
                draft.priority.level(),
                draft.is_active,
                draft.start_date.format(DATE_FORMAT).to_string(),
                draft.end_date.map(|date| date.format(DATE_FORMAT).to_string()),
                draft.reminder_time,
                now_ms,
            ],
        )?;
        Ok(changed)
    }
}

impl HabitRepository for SqliteHabitRepository<'_> {
    fn list_habits(&self) -> StoreResult<Vec<Habit>> {
        self.query_habits("", Vec::new())
    }

    fn search_habits(&self, query: &str) -> StoreResult<Vec<Habit>> {
        self.query_habits(
            "WHERE instr(fold_case(name), ?1) > 0 OR instr(fold_case(description), ?1) > 0",
            vec![Value::Text(search_needle(query))],
        )
    }

    fn get_habit(&self, id: HabitId) -> StoreResult<Option<Habit>> {
        let mut habits = self.query_habits("WHERE id = ?1", vec![Value::Text(id.to_string())])?;
        Ok(habits.pop())
    }

    fn create_habit(&self, draft: &HabitDraft, now_ms: i64) -> StoreResult<HabitId> {
        let draft = draft.normalized()?;
        let id = Uuid::new_v4();
        let id_text = id.to_string();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        self.write_row(
            &tx,
            "INSERT INTO habits (
                id, name, description, category, frequency_type, frequency_data,
                target_value, target_unit, color, icon, priority, is_active,
                start_date, end_date, reminder_time, current_streak, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, 0, ?16, ?16);",
            &id_text,
            &draft,
            now_ms,
        )?;
        TagLinks::Habits.replace(&tx, &id_text, &draft.tags, now_ms)?;
        tx.commit()?;
        Ok(id)
    }

    fn update_habit(&self, id: HabitId, draft: &HabitDraft, now_ms: i64) -> StoreResult<()> {
        let draft = draft.normalized()?;
        let id_text = id.to_string();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = self.write_row(
            &tx,
            "UPDATE habits
             SET name = ?2, description = ?3, category = ?4,
                 frequency_type = ?5, frequency_data = ?6,
                 target_value = ?7, target_unit = ?8, color = ?9, icon = ?10,
                 priority = ?11, is_active = ?12, start_date = ?13, end_date = ?14,
                 reminder_time = ?15, updated_at = ?16
             WHERE id = ?1;",
            &id_text,
            &draft,
            now_ms,
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                entity: "habit",
                id,
            });
        }
        TagLinks::Habits.replace(&tx, &id_text, &draft.tags, now_ms)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_habit(&self, id: HabitId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM habits WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                entity: "habit",
                id,
            });
        }
        Ok(())
    }

    fn set_habit_flag(
        &self,
        id: HabitId,
        flag: DocumentFlag,
        value: bool,
        now_ms: i64,
    ) -> StoreResult<()> {
        if flag != DocumentFlag::Active {
            return Err(StoreError::InvalidData(format!(
                "habits have no `{}` flag",
                flag.as_str()
            )));
        }
        let changed = self.conn.execute(
            "UPDATE habits SET is_active = ?2, updated_at = ?3 WHERE id = ?1;",
            params![id.to_string(), value, now_ms],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound {
                entity: "habit",
                id,
            });
        }
        Ok(())
    }

    fn complete_habit(&self, id: HabitId, date: NaiveDate, now_ms: i64) -> StoreResult<()> {
        let id_text = id.to_string();

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let stored: Option<(String, String)> = tx
            .query_row(
                "SELECT frequency_type, frequency_data FROM habits WHERE id = ?1;",
                params![id_text],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((frequency_type, frequency_data)) = stored else {
            return Err(StoreError::NotFound {
                entity: "habit",
                id,
            });
        };
        let frequency = decode_frequency(&id_text, &frequency_type, &frequency_data);

        tx.execute(
            "INSERT OR IGNORE INTO habit_completions (id, habit_id, completed_on, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                Uuid::new_v4().to_string(),
                id_text,
                date.format(DATE_FORMAT).to_string(),
                now_ms
            ],
        )?;
        let streaks = frequency.streaks(&load_completions(&tx, &id_text)?);
        tx.execute(
            "UPDATE habits
             SET current_streak = ?2, longest_streak = ?3, last_completed = ?4, updated_at = ?5
             WHERE id = ?1;",
            params![
                id_text,
                streaks.current,
                streaks.longest,
                streaks
                    .last_completed
                    .map(|last| last.format(DATE_FORMAT).to_string()),
                now_ms
            ],
        )?;
        tx.commit()?;

        info!(
            "event=habit_completed module=store status=ok habit_id={} date={} streak={}",
            id_text, date, streaks.current
        );
        Ok(())
    }

    fn list_completions(&self, id: HabitId) -> StoreResult<Vec<NaiveDate>> {
        load_completions(self.conn, &id.to_string())
    }
}

fn load_completions(conn: &Connection, habit_id: &str) -> StoreResult<Vec<NaiveDate>> {
    let mut stmt = conn.prepare(
        "SELECT completed_on FROM habit_completions WHERE habit_id = ?1 ORDER BY completed_on ASC;",
    )?;
    let mut rows = stmt.query([habit_id])?;
    let mut dates = Vec::new();
    while let Some(row) = rows.next()? {
        dates.push(parse_date(
            &row.get::<_, String>(0)?,
            "habit_completions.completed_on",
        )?);
    }
    Ok(dates)
}

fn decode_frequency(habit_id: &str, kind: &str, data: &str) -> RecurrenceRule {
    RecurrenceRule::from_storage(kind, data).unwrap_or_else(|err| {
        warn!(
            "event=recurrence_decode module=store status=fallback habit_id={} error={}",
            habit_id, err
        );
        RecurrenceRule::Daily
    })
}

fn habit_from_row(conn: &Connection, row: &Row<'_>) -> StoreResult<Habit> {
    let id_text: String = row.get("id")?;
    let frequency_type: String = row.get("frequency_type")?;
    let frequency_data: String = row.get("frequency_data")?;
    let frequency = decode_frequency(&id_text, &frequency_type, &frequency_data);
    let priority = Priority::try_from(row.get::<_, i64>("priority")?)
        .map_err(|err| StoreError::InvalidData(err.to_string()))?;
    let end_date: Option<String> = row.get("end_date")?;
    let last_completed: Option<String> = row.get("last_completed")?;

    Ok(Habit {
        id: parse_uuid(&id_text, "habits.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        category: row.get("category")?,
        tags: TagLinks::Habits.load(conn, &id_text)?,
        frequency,
        target_value: row.get("target_value")?,
        target_unit: row.get("target_unit")?,
        color: row.get("color")?,
        icon: row.get("icon")?,
        priority,
        is_active: row.get("is_active")?,
        start_date: parse_date(&row.get::<_, String>("start_date")?, "habits.start_date")?,
        end_date: end_date
            .map(|value| parse_date(&value, "habits.end_date"))
            .transpose()?,
        reminder_time: row.get("reminder_time")?,
        current_streak: row.get("current_streak")?,
        longest_streak: row.get("longest_streak")?,
        last_completed: last_completed
            .map(|value| parse_date(&value, "habits.last_completed"))
            .transpose()?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn parse_date(value: &str, column: &str) -> StoreResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| StoreError::InvalidData(format!("invalid date `{value}` in {column}")))
}
