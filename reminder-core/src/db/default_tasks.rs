use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{ensure_exists, Database};
use crate::error::{Error, Result};
use crate::models::{CreateDefaultTaskInput, DefaultTask, UpdateDefaultTaskInput};

pub(super) const DEFAULT_TASK_COLUMNS: &str = "id, event_id, name, days_before, description";

pub(super) fn default_task_from_row(row: &Row<'_>) -> rusqlite::Result<DefaultTask> {
    Ok(DefaultTask {
        id: row.get(0)?,
        event_id: row.get(1)?,
        name: row.get(2)?,
        days_before: row.get(3)?,
        description: row.get(4)?,
    })
}

fn find_default_task(conn: &Connection, id: i64) -> Result<DefaultTask> {
    conn.query_row(
        &format!("SELECT {DEFAULT_TASK_COLUMNS} FROM default_tasks WHERE id = ?1"),
        [id],
        default_task_from_row,
    )
    .optional()?
    .ok_or_else(|| Error::not_found("default task", id))
}

/// Default tasks of an event, longest lead time first.
pub(super) fn default_tasks_for_event(conn: &Connection, event_id: i64) -> Result<Vec<DefaultTask>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DEFAULT_TASK_COLUMNS} FROM default_tasks WHERE event_id = ?1 \
         ORDER BY days_before DESC, id ASC"
    ))?;
    let tasks = stmt
        .query_map([event_id], default_task_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tasks)
}

impl Database {
    pub fn create_default_task(
        &self,
        event_id: i64,
        input: CreateDefaultTaskInput,
    ) -> Result<DefaultTask> {
        let days_before = input.validate()?;
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            ensure_exists(&tx, "events", "event", event_id)?;
            tx.execute(
                "INSERT INTO default_tasks (event_id, name, days_before, description) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![event_id, input.name, days_before, input.description],
            )?;
            let task = DefaultTask {
                id: tx.last_insert_rowid(),
                event_id,
                name: input.name,
                days_before,
                description: input.description,
            };
            tx.commit()?;
            tracing::debug!(event_id, default_task_id = task.id, "created default task");
            Ok(task)
        })
    }

    pub fn get_default_task(&self, id: i64) -> Result<DefaultTask> {
        self.with_connection(|conn| find_default_task(conn, id))
    }

    pub fn list_default_tasks(&self, event_id: i64) -> Result<Vec<DefaultTask>> {
        self.with_connection(|conn| {
            ensure_exists(conn, "events", "event", event_id)?;
            default_tasks_for_event(conn, event_id)
        })
    }

    /// Partial update. Tasks already copied into holdings are not touched.
    pub fn update_default_task(
        &self,
        id: i64,
        input: UpdateDefaultTaskInput,
    ) -> Result<DefaultTask> {
        input.validate()?;
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            let mut task = find_default_task(&tx, id)?;
            input.apply(&mut task)?;
            tx.execute(
                "UPDATE default_tasks SET name = ?1, days_before = ?2, description = ?3 WHERE id = ?4",
                params![task.name, task.days_before, task.description, id],
            )?;
            tx.commit()?;
            Ok(task)
        })
    }

    pub fn delete_default_task(&self, id: i64) -> Result<()> {
        self.with_connection(|conn| {
            if conn.execute("DELETE FROM default_tasks WHERE id = ?1", [id])? == 0 {
                return Err(Error::not_found("default task", id));
            }
            Ok(())
        })
    }
}
