use serde::{Deserialize, Serialize};

use super::{days_before, require_text};
use crate::error::Result;

/// Template task defined at the event level and copied into new holdings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DefaultTask {
    #[serde(with = "super::id")]
    pub id: i64,
    #[serde(with = "super::id")]
    pub event_id: i64,
    pub name: String,
    pub days_before: u32,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDefaultTaskInput {
    pub name: String,
    pub days_before: i64,
    #[serde(default)]
    pub description: String,
}

impl CreateDefaultTaskInput {
    /// Check the input and return the validated lead time.
    pub fn validate(&self) -> Result<u32> {
        require_text("task name", &self.name)?;
        days_before(self.days_before)
    }
}

/// Partial update: absent fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateDefaultTaskInput {
    pub name: Option<String>,
    pub days_before: Option<i64>,
    pub description: Option<String>,
}

impl UpdateDefaultTaskInput {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            require_text("task name", name)?;
        }
        if let Some(days) = self.days_before {
            days_before(days)?;
        }
        Ok(())
    }

    /// Apply the supplied fields on top of `task`. Call [`Self::validate`] first.
    pub fn apply(&self, task: &mut DefaultTask) -> Result<()> {
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
