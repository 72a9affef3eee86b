//! Task template engine.
//!
//! Seeds the task list of a newly inserted holding. Runs on the caller's
//! transaction so the holding and its tasks commit or roll back together.

use std::fmt;
use std::str::FromStr;

use rusqlite::{Connection, OptionalExtension};

use super::default_tasks::default_tasks_for_event;
use super::tasks::{insert_task, tasks_for_holding};
use crate::error::Result;
use crate::models::{Holding, Task};

/// Where a new holding's tasks come from. Exactly one policy is active per
/// process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TemplatePolicy {
    /// Copy the event's default tasks.
    #[default]
    EventDefaults,
    /// Copy the tasks of the most recently dated other holding of the same event.
    CarryForward,
}

impl TemplatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EventDefaults => "event-defaults",
            Self::CarryForward => "carry-forward",
        }
    }
}

impl FromStr for TemplatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "event-defaults" => Ok(Self::EventDefaults),
            "carry-forward" => Ok(Self::CarryForward),
            other => Err(format!(
                "unknown template policy '{other}' (expected event-defaults or carry-forward)"
            )),
        }
    }
}

impl fmt::Display for TemplatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct TaskTemplate {
    name: String,
    days_before: u32,
    description: String,
}

pub(super) fn seed_tasks(
    conn: &Connection,
    holding: &Holding,
    policy: TemplatePolicy,
) -> Result<Vec<Task>> {
    let templates = match policy {
        TemplatePolicy::EventDefaults => from_event_defaults(conn, holding.event_id)?,
        TemplatePolicy::CarryForward => from_previous_holding(conn, holding)?,
    };

    templates
        .iter()
        .map(|t| insert_task(conn, holding.id, &t.name, t.days_before, &t.description))
        .collect()
}

fn from_event_defaults(conn: &Connection, event_id: i64) -> Result<Vec<TaskTemplate>> {
    Ok(default_tasks_for_event(conn, event_id)?
        .into_iter()
        .map(|t| TaskTemplate {
            name: t.name,
            days_before: t.days_before,
            description: t.description,
        })
        .collect())
}

/// Reminded state of the source tasks is ignored; every copy starts unreminded.
fn from_previous_holding(conn: &Connection, holding: &Holding) -> Result<Vec<TaskTemplate>> {
    let previous: Option<i64> = conn
        .query_row(
            "SELECT id FROM holdings WHERE event_id = ?1 AND id != ?2 \
             ORDER BY date DESC, id DESC LIMIT 1",
            [holding.event_id, holding.id],
            |row| row.get(0),
        )
        .optional()?;

    let Some(previous) = previous else {
        tracing::debug!(event_id = holding.event_id, "no previous holding to carry tasks from");
        return Ok(Vec::new());
    };

    Ok(tasks_for_holding(conn, previous)?
        .into_iter()
        .map(|t| TaskTemplate {
            name: t.name,
            days_before: t.days_before,
            description: t.description,
        })
        .collect())
}
