use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use daypilot_core::Category;

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers::{self, date_key};

/// A stored task row.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskRow {
    pub id: i64,
    pub title: String,
    pub category: Category,
    pub justification: String,
    pub impact: Option<String>,
    pub task_date: NaiveDate,
    pub completed: bool,
    pub completed_at: Option<String>,
}

/// Aggregate completion counts for one day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: u32,
    pub completed: u32,
    pub pending: u32,
}

impl TaskStats {
    /// Completion percentage rounded to the nearest integer, 0 for an
    /// empty day.
    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (f64::from(self.completed) / f64::from(self.total) * 100.0).round() as u32
    }
}

/// Config-table keys holding JSON arrays of seed titles.
pub const CONFIG_KEY_RECOVERY: &str = "default_recovery_tasks";
pub const CONFIG_KEY_CORE: &str = "default_core_tasks";

/// Seed titles used when the config table has no override.
const FALLBACK_RECOVERY: &[&str] = &["Exercise", "Reading", "Sleep (8h)"];
const FALLBACK_CORE: &[&str] = &["Deep work", "Outreach"];

const TASK_COLUMNS: &str =
    "id, title, category, justification, impact, task_date, completed, completed_at";

pub struct TaskRepo {
    db: Database,
}

impl TaskRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert one task for the given day and return it with its assigned id.
    #[instrument(skip(self, title, justification, impact), fields(on = %on, category = %category))]
    pub fn add(
        &self,
        on: NaiveDate,
        title: &str,
        category: Category,
        justification: &str,
        impact: Option<&str>,
    ) -> Result<TaskRow, StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (title, category, justification, impact, task_date)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![title, category.as_str(), justification, impact, date_key(on)],
            )?;

            Ok(TaskRow {
                id: conn.last_insert_rowid(),
                title: title.to_string(),
                category: category.clone(),
                justification: justification.to_string(),
                impact: impact.map(str::to_string),
                task_date: on,
                completed: false,
                completed_at: None,
            })
        })
    }

    /// All tasks for the given day, ordered by category then id ascending.
    #[instrument(skip(self), fields(on = %on))]
    pub fn list_for(&self, on: NaiveDate) -> Result<Vec<TaskRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks WHERE task_date = ?1 ORDER BY category, id"
            ))?;
            let mut rows = stmt.query([date_key(on)])?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                results.push(row_to_task(row)?);
            }
            Ok(results)
        })
    }

    /// Unfinished tasks for the given day, same ordering as `list_for`.
    #[instrument(skip(self), fields(on = %on))]
    pub fn incomplete_for(&self, on: NaiveDate) -> Result<Vec<TaskRow>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TASK_COLUMNS} FROM tasks
                 WHERE task_date = ?1 AND completed = 0 ORDER BY category, id"
            ))?;
            let mut rows = stmt.query([date_key(on)])?;
            let mut results = Vec::new();
            while let Some(row) = rows.next()? {
                results.push(row_to_task(row)?);
            }
            Ok(results)
        })
    }

    /// Mark a task completed. None when no row matches id + date, so a
    /// previous day's id is invisible here. Re-marking a completed task
    /// just re-applies the same state.
    #[instrument(skip(self), fields(on = %on, id))]
    pub fn mark_done(&self, on: NaiveDate, id: i64) -> Result<Option<TaskRow>, StoreError> {
        self.db.with_conn(|conn| {
            let now = Utc::now().to_rfc3339();
            let changed = conn.execute(
                "UPDATE tasks SET completed = 1, completed_at = ?1
                 WHERE id = ?2 AND task_date = ?3",
                rusqlite::params![now, id, date_key(on)],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            fetch(conn, on, id)
        })
    }

    /// Inverse of `mark_done`: clears the completion timestamp.
    #[instrument(skip(self), fields(on = %on, id))]
    pub fn mark_undone(&self, on: NaiveDate, id: i64) -> Result<Option<TaskRow>, StoreError> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE tasks SET completed = 0, completed_at = NULL
                 WHERE id = ?1 AND task_date = ?2",
                rusqlite::params![id, date_key(on)],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            fetch(conn, on, id)
        })
    }

    /// Delete a task. True when a row was removed.
    #[instrument(skip(self), fields(on = %on, id))]
    pub fn delete(&self, on: NaiveDate, id: i64) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM tasks WHERE id = ?1 AND task_date = ?2",
                rusqlite::params![id, date_key(on)],
            )?;
            Ok(removed > 0)
        })
    }

    /// Aggregate counts for the given day.
    #[instrument(skip(self), fields(on = %on))]
    pub fn stats_for(&self, on: NaiveDate) -> Result<TaskStats, StoreError> {
        self.db.with_conn(|conn| {
            let (total, completed): (u32, u32) = conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(completed), 0) FROM tasks WHERE task_date = ?1",
                [date_key(on)],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            Ok(TaskStats {
                total,
                completed,
                pending: total - completed,
            })
        })
    }

    pub fn has_tasks(&self, on: NaiveDate) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let exists: i64 = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM tasks WHERE task_date = ?1)",
                [date_key(on)],
                |row| row.get(0),
            )?;
            Ok(exists != 0)
        })
    }

    pub fn has_completed_any(&self, on: NaiveDate) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let exists: i64 = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM tasks WHERE task_date = ?1 AND completed = 1)",
                [date_key(on)],
                |row| row.get(0),
            )?;
            Ok(exists != 0)
        })
    }

    /// Seed the day's default task set: recovery titles first, then core
    /// titles, in one transaction. No-op (empty result) when any task
    /// already exists for the day — the guard against double-seeding.
    #[instrument(skip(self), fields(on = %on))]
    pub fn seed_defaults(&self, on: NaiveDate) -> Result<Vec<TaskRow>, StoreError> {
        self.db.with_conn(|conn| {
            let exists: i64 = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM tasks WHERE task_date = ?1)",
                [date_key(on)],
                |row| row.get(0),
            )?;
            if exists != 0 {
                return Ok(Vec::new());
            }

            let recovery = seed_titles(conn, CONFIG_KEY_RECOVERY, FALLBACK_RECOVERY)?;
            let core = seed_titles(conn, CONFIG_KEY_CORE, FALLBACK_CORE)?;

            let tx = conn.unchecked_transaction()?;
            let mut created = Vec::new();
            for (titles, category) in [(recovery, Category::Recovery), (core, Category::Core)] {
                for title in titles {
                    tx.execute(
                        "INSERT INTO tasks (title, category, task_date) VALUES (?1, ?2, ?3)",
                        rusqlite::params![title, category.as_str(), date_key(on)],
                    )?;
                    created.push(TaskRow {
                        id: tx.last_insert_rowid(),
                        title,
                        category: category.clone(),
                        justification: String::new(),
                        impact: None,
                        task_date: on,
                        completed: false,
                        completed_at: None,
                    });
                }
            }
            tx.commit()?;
            Ok(created)
        })
    }
}

/// Read a JSON array of titles from the config table, falling back to the
/// built-in defaults when the key is absent or unparsable.
fn seed_titles(
    conn: &Connection,
    key: &str,
    fallback: &[&str],
) -> Result<Vec<String>, StoreError> {
    let raw: Option<String> = conn
        .query_row("SELECT value FROM config WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(raw
        .and_then(|value| serde_json::from_str::<Vec<String>>(&value).ok())
        .unwrap_or_else(|| fallback.iter().map(|t| t.to_string()).collect()))
}

fn fetch(conn: &Connection, on: NaiveDate, id: i64) -> Result<Option<TaskRow>, StoreError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND task_date = ?2"
    ))?;
    let mut rows = stmt.query(rusqlite::params![id, date_key(on)])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_task(row)?)),
        None => Ok(None),
    }
}

fn row_to_task(row: &rusqlite::Row<'_>) -> Result<TaskRow, StoreError> {
    let category: String = row_helpers::get(row, 2, "tasks", "category")?;
    let date_raw: String = row_helpers::get(row, 5, "tasks", "task_date")?;

    Ok(TaskRow {
        id: row_helpers::get(row, 0, "tasks", "id")?,
        title: row_helpers::get(row, 1, "tasks", "title")?,
        category: Category::from(category),
        justification: row_helpers::get(row, 3, "tasks", "justification")?,
        impact: row_helpers::get_opt(row, 4, "tasks", "impact")?,
        task_date: row_helpers::parse_date(&date_raw, "tasks", "task_date")?,
        completed: row_helpers::get::<i64>(row, 6, "tasks", "completed")? != 0,
        completed_at: row_helpers::get_opt(row, 7, "tasks", "completed_at")?,
    })
}
