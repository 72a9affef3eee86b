use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{days_before, require_text};
use crate::error::Result;

/// Checklist item attached to a holding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(with = "super::id")]
    pub id: i64,
    #[serde(with = "super::id")]
    pub holding_id: i64,
    pub name: String,
    pub days_before: u32,
    pub description: String,
    pub reminded: bool,
}

impl Task {
    /// The date from which this task may be reminded.
    pub fn remind_on(&self, holding_date: NaiveDate) -> NaiveDate {
        remind_on(holding_date, self.days_before)
    }

    pub fn state(&self, holding_date: NaiveDate, today: NaiveDate) -> ReminderState {
        if self.reminded {
            ReminderState::Reminded
        } else if self.remind_on(holding_date) <= today {
            ReminderState::Due
        } else {
            ReminderState::Pending
        }
    }
}

/// `holding_date - days_before`, clamped to the earliest representable date.
pub fn remind_on(holding_date: NaiveDate, days_before: u32) -> NaiveDate {
    holding_date
        .checked_sub_days(Days::new(u64::from(days_before)))
        .unwrap_or(NaiveDate::MIN)
}

/// Reminder lifecycle of a task. `Reminded` is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReminderState {
    Pending,
    Due,
    Reminded,
}

impl ReminderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Due => "due",
            Self::Reminded => "reminded",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskInput {
    pub name: String,
    pub days_before: i64,
    #[serde(default)]
    pub description: String,
}

impl CreateTaskInput {
    /// Check the input and return the validated lead time.
    pub fn validate(&self) -> Result<u32> {
        require_text("task name", &self.name)?;
        days_before(self.days_before)
    }
}

/// Partial update: absent fields stay unchanged. The `reminded` flag is owned
/// by the scheduler and cannot be set here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateTaskInput {
    pub name: Option<String>,
    pub days_before: Option<i64>,
    pub description: Option<String>,
}

impl UpdateTaskInput {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            require_text("task name", name)?;
        }
        if let Some(days) = self.days_before {
            days_before(days)?;
        }
        Ok(())
    }

    pub fn apply(&self, task: &mut Task) -> Result<()> {
        if let Some(name) = &self.name {
            task.name = name.clone();
        }
        if let Some(days) = self.days_before {
            task.days_before = days_before(days)?;
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        Ok(())
    }
}

/// A task together with its computed reminder date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    #[serde(flatten)]
    pub task: Task,
    pub remind_on: NaiveDate,
}

impl TaskView {
    pub fn new(task: Task, holding_date: NaiveDate) -> Self {
        let remind_on = task.remind_on(holding_date);
        Self { task, remind_on }
    }
}
