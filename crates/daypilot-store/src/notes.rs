use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::database::Database;
use crate::error::StoreError;
use crate::row_helpers::date_key;

/// The free-text note attached to one day. At most one per date.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NoteRow {
    pub note_date: NaiveDate,
    pub note: String,
    pub updated_at: String,
}

pub struct NoteRepo {
    db: Database,
}

impl NoteRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Upsert the day's note. Writing again overwrites the previous text.
    #[instrument(skip(self, text), fields(on = %on))]
    pub fn set(&self, on: NaiveDate, text: &str) -> Result<NoteRow, StoreError> {
        self.db.with_conn(|conn| {
            let now = Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO daily_notes (note_date, note, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (note_date)
                 DO UPDATE SET note = excluded.note, updated_at = excluded.updated_at",
                rusqlite::params![date_key(on), text, now],
            )?;

            Ok(NoteRow {
                note_date: on,
                note: text.to_string(),
                updated_at: now,
            })
        })
    }

    /// The day's note text, if one was written.
    #[instrument(skip(self), fields(on = %on))]
    pub fn get(&self, on: NaiveDate) -> Result<Option<String>, StoreError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT note FROM daily_notes WHERE note_date = ?1",
                [date_key(on)],
                |row| row.get(0),
            )
            .optional()
            .map_err(StoreError::from)
        })
    }
}
