use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A due, unreminded task joined with the holding it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DueReminder {
    pub task_id: i64,
    pub task_name: String,
    pub description: String,
    pub days_before: u32,
    pub holding_id: i64,
    pub holding_name: String,
    pub holding_date: NaiveDate,
    pub channel_id: String,
    pub mention: String,
}

impl DueReminder {
    pub fn remind_on(&self) -> NaiveDate {
        super::remind_on(self.holding_date, self.days_before)
    }
}
