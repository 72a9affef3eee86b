use chrono::NaiveDate;
use rusqlite::OptionalExtension;

use super::Database;
use crate::error::Result;
use crate::models::DueReminder;

impl Database {
    /// Unreminded tasks whose reminder date (holding date minus lead time) is
    /// on or before `today`, joined with their holding.
    pub fn due_reminders(&self, today: NaiveDate) -> Result<Vec<DueReminder>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT t.id, t.name, t.description, t.days_before, \
                        h.id, h.name, h.date, h.channel_id, h.mention \
                 FROM tasks t \
                 INNER JOIN holdings h ON t.holding_id = h.id \
                 WHERE t.reminded = 0 \
                   AND julianday(h.date) - t.days_before <= julianday(?1) \
                 ORDER BY h.date ASC, t.days_before DESC, t.id ASC",
            )?;
            let rows = stmt.query_map([today], |row| {
                Ok(DueReminder {
                    task_id: row.get(0)?,
                    task_name: row.get(1)?,
                    description: row.get(2)?,
                    days_before: row.get(3)?,
                    holding_id: row.get(4)?,
                    holding_name: row.get(5)?,
                    holding_date: row.get(6)?,
                    channel_id: row.get(7)?,
                    mention: row.get(8)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    /// Whether the task still exists and has not been reminded yet.
    pub fn is_pending(&self, task_id: i64) -> Result<bool> {
        self.with_connection(|conn| {
            let reminded: Option<bool> = conn
                .query_row("SELECT reminded FROM tasks WHERE id = ?1", [task_id], |row| {
                    row.get(0)
                })
                .optional()?;
            Ok(reminded == Some(false))
        })
    }

    /// Flip the reminded flag. Returns `false` when the task is gone or was
    /// already reminded; the flag never goes back to `false`.
    pub fn mark_reminded(&self, task_id: i64) -> Result<bool> {
        self.with_connection(|conn| {
            let changed = conn.execute(
                "UPDATE tasks SET reminded = 1 WHERE id = ?1 AND reminded = 0",
                [task_id],
            )?;
            Ok(changed == 1)
        })
    }
}
