use rusqlite::{params, Connection, OptionalExtension, Row};

use super::template::{seed_tasks, TemplatePolicy};
use super::{ensure_exists, Database};
use crate::error::{Error, Result};
use crate::models::{CreateHoldingInput, CreatedHolding, Holding, UpdateHoldingInput};

const HOLDING_COLUMNS: &str = "id, event_id, name, date, channel_id, mention";

/// Which holdings to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldingFilter {
    All,
    Event(i64),
}

fn holding_from_row(row: &Row<'_>) -> rusqlite::Result<Holding> {
    Ok(Holding {
        id: row.get(0)?,
        event_id: row.get(1)?,
        name: row.get(2)?,
        date: row.get(3)?,
        channel_id: row.get(4)?,
        mention: row.get(5)?,
    })
}

fn find_holding(conn: &Connection, id: i64) -> Result<Holding> {
    conn.query_row(
        &format!("SELECT {HOLDING_COLUMNS} FROM holdings WHERE id = ?1"),
        [id],
        holding_from_row,
    )
    .optional()?
    .ok_or_else(|| Error::not_found("holding", id))
}

impl Database {
    /// Insert a holding and seed its task list according to `policy`.
    ///
    /// The holding and every seeded task are written in one transaction, so a
    /// failure while copying tasks leaves no holding behind.
    pub fn create_holding(
        &self,
        input: CreateHoldingInput,
        policy: TemplatePolicy,
    ) -> Result<CreatedHolding> {
        let date = input.validate()?;
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            ensure_exists(&tx, "events", "event", input.event_id)?;
            tx.execute(
                "INSERT INTO holdings (event_id, name, date, channel_id, mention) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![input.event_id, input.name, date, input.channel_id, input.mention],
            )?;
            let holding = Holding {
                id: tx.last_insert_rowid(),
                event_id: input.event_id,
                name: input.name,
                date,
                channel_id: input.channel_id,
                mention: input.mention,
            };

            let created_tasks = seed_tasks(&tx, &holding, policy).inspect_err(|e| {
                tracing::error!(holding_name = %holding.name, "failed to seed holding tasks: {e}");
            })?;
            tx.commit()?;

            tracing::info!(
                holding_id = holding.id,
                event_id = holding.event_id,
                policy = policy.as_str(),
                tasks = created_tasks.len(),
                "created holding"
            );
            Ok(CreatedHolding {
                holding,
                created_tasks,
            })
        })
    }

    pub fn get_holding(&self, id: i64) -> Result<Holding> {
        self.with_connection(|conn| find_holding(conn, id))
    }

    /// Holdings, most recent date first.
    pub fn list_holdings(&self, filter: HoldingFilter) -> Result<Vec<Holding>> {
        self.with_connection(|conn| {
            let holdings = match filter {
                HoldingFilter::All => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {HOLDING_COLUMNS} FROM holdings ORDER BY date DESC, id DESC"
                    ))?;
                    let rows = stmt.query_map([], holding_from_row)?;
                    rows.collect::<rusqlite::Result<Vec<_>>>()?
                }
                HoldingFilter::Event(event_id) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {HOLDING_COLUMNS} FROM holdings WHERE event_id = ?1 \
                         ORDER BY date DESC, id DESC"
                    ))?;
                    let rows = stmt.query_map([event_id], holding_from_row)?;
                    rows.collect::<rusqlite::Result<Vec<_>>>()?
                }
            };
            Ok(holdings)
        })
    }

    /// Partial update of name, date, channel and mention.
    pub fn update_holding(&self, id: i64, input: UpdateHoldingInput) -> Result<Holding> {
        input.validate()?;
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            let mut holding = find_holding(&tx, id)?;
            input.apply(&mut holding)?;
            tx.execute(
                "UPDATE holdings SET name = ?1, date = ?2, channel_id = ?3, mention = ?4 WHERE id = ?5",
                params![
                    holding.name,
                    holding.date,
                    holding.channel_id,
                    holding.mention,
                    id
                ],
            )?;
            tx.commit()?;
            Ok(holding)
        })
    }

    /// Delete a holding and all of its tasks.
    pub fn delete_holding(&self, id: i64) -> Result<()> {
        self.with_connection(|conn| {
            let tx = conn.transaction()?;
            let tasks = tx.execute("DELETE FROM tasks WHERE holding_id = ?1", [id])?;
            if tx.execute("DELETE FROM holdings WHERE id = ?1", [id])? == 0 {
                return Err(Error::not_found("holding", id));
            }
            tx.commit()?;
            tracing::info!(holding_id = id, tasks, "deleted holding");
            Ok(())
        })
    }
}
