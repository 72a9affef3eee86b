use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{ensure_exists, Database};
use crate::error::{Error, Result};
use crate::models::{CreateTaskInput, Task, UpdateTaskInput};

pub(super) const TASK_COLUMNS: &str = "id, holding_id, name, days_before, description, reminded";

pub(super) fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        holding_id: row.get(1)?,
        name: row.get(2)?,
        days_before: row.get(3)?,
        description: row.get(4)?,
        reminded: row.get(5)?,
    })
}

fn find_task(conn: &Connection, id: i64) -> Result<Task> {
    conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
        [id],
        task_from_row,
    )
    .optional()?
    .ok_or_else(|| Error::not_found("task", id))
}

/// Tasks of a holding, longest lead time first.
pub(super) fn tasks_for_holding(conn: &Connection, holding_id: i64) -> Result<Vec<Task>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE holding_id = ?1 ORDER BY days_before DESC, id ASC"
    ))?;
    let tasks = stmt
        .query_map([holding_id], task_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tasks)
}

/// Insert an unreminded task row.
pub(super) fn insert_task(
    conn: &Connection,
    holding_id: i64,
    name: &str,
    days_before: u32,
    description: &str,
) -> Result<Task> {
    conn.execute(
        "INSERT INTO tasks (holding_id, name, days_before, description, reminded) \
         VALUES (?1, ?2, ?3, ?4, 0)",
        params![holding_id, name, days_before, description],
    )?;
    Ok(Task {
        id: conn.last_insert_rowid(),
        holding_id,
        name: name.to_string(),
        days_before,
        description: description.to_string(),
        reminded: false,
    })
}

impl Database {
    pub fn create_task(&self, holding_id: i64, input: CreateTaskInput) -> Result<Task> {
        let days_before = input.validate()?;
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            ensure_exists(&tx, "holdings", "holding", holding_id)?;
            let task = insert_task(&tx, holding_id, &input.name, days_before, &input.description)?;
            tx.commit()?;
            tracing::debug!(holding_id, task_id = task.id, "created task");
            Ok(task)
        })
    }

    pub fn get_task(&self, id: i64) -> Result<Task> {
        self.with_connection(|conn| find_task(conn, id))
    }

    pub fn list_tasks(&self, holding_id: i64) -> Result<Vec<Task>> {
        self.with_connection(|conn| {
            ensure_exists(conn, "holdings", "holding", holding_id)?;
            tasks_for_holding(conn, holding_id)
        })
    }

    /// Partial update of name, lead time and description. The reminded flag
    /// is left alone.
    pub fn update_task(&self, id: i64, input: UpdateTaskInput) -> Result<Task> {
        input.validate()?;
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            let mut task = find_task(&tx, id)?;
            input.apply(&mut task)?;
            tx.execute(
                "UPDATE tasks SET name = ?1, days_before = ?2, description = ?3 WHERE id = ?4",
                params![task.name, task.days_before, task.description, id],
            )?;
            tx.commit()?;
            Ok(task)
        })
    }

    pub fn delete_task(&self, id: i64) -> Result<()> {
        self.with_connection(|conn| {
            if conn.execute("DELETE FROM tasks WHERE id = ?1", [id])? == 0 {
                return Err(Error::not_found("task", id));
            }
            Ok(())
        })
    }
}
