use rusqlite::{params, Connection, OptionalExtension, Row};

use super::Database;
use crate::error::{Error, Result};
use crate::models::{CreateEventInput, Event, UpdateEventInput};

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

fn find_event(conn: &Connection, id: i64) -> Result<Event> {
    conn.query_row(
        "SELECT id, name FROM events WHERE id = ?1",
        [id],
        event_from_row,
    )
    .optional()?
    .ok_or_else(|| Error::not_found("event", id))
}

impl Database {
    pub fn create_event(&self, input: CreateEventInput) -> Result<Event> {
        input.validate()?;
        self.with_connection(|conn| {
            conn.execute("INSERT INTO events (name) VALUES (?1)", [&input.name])?;
            let event = Event {
                id: conn.last_insert_rowid(),
                name: input.name,
            };
            tracing::debug!(event_id = event.id, "created event");
            Ok(event)
        })
    }

    pub fn get_event(&self, id: i64) -> Result<Event> {
        self.with_connection(|conn| find_event(conn, id))
    }

    pub fn list_events(&self) -> Result<Vec<Event>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM events ORDER BY id DESC")?;
            let events = stmt
                .query_map([], event_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(events)
        })
    }

    /// Replace the event's name.
    pub fn update_event(&self, id: i64, input: UpdateEventInput) -> Result<Event> {
        input.validate()?;
        self.with_connection(|conn| {
            let changed = conn.execute(
                "UPDATE events SET name = ?1 WHERE id = ?2",
                params![input.name, id],
            )?;
            if changed == 0 {
                return Err(Error::not_found("event", id));
            }
            find_event(conn, id)
        })
    }

    /// Delete an event together with its default tasks, holdings and their tasks.
    pub fn delete_event(&self, id: i64) -> Result<()> {
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            let tasks = tx.execute(
                "DELETE FROM tasks WHERE holding_id IN (SELECT id FROM holdings WHERE event_id = ?1)",
                [id],
            )?;
            let holdings = tx.execute("DELETE FROM holdings WHERE event_id = ?1", [id])?;
            let defaults = tx.execute("DELETE FROM default_tasks WHERE event_id = ?1", [id])?;
            if tx.execute("DELETE FROM events WHERE id = ?1", [id])? == 0 {
                return Err(Error::not_found("event", id));
            }
            tx.commit()?;
            tracing::info!(
                event_id = id,
                holdings,
                tasks,
                default_tasks = defaults,
                "deleted event"
            );
            Ok(())
        })
    }
}
