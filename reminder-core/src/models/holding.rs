use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{parse_date, require_text, Task};
use crate::error::{Error, Result};

/// One scheduled occurrence of an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    #[serde(with = "super::id")]
    pub id: i64,
    #[serde(with = "super::id")]
    pub event_id: i64,
    pub name: String,
    pub date: NaiveDate,
    pub channel_id: String,
    pub mention: String,
}

/// A freshly created holding and the tasks seeded into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedHolding {
    #[serde(flatten)]
    pub holding: Holding,
    pub created_tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHoldingInput {
    #[serde(with = "super::id")]
    pub event_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub mention: String,
}

impl CreateHoldingInput {
    /// Check the input and return the parsed holding date.
    pub fn validate(&self) -> Result<NaiveDate> {
        require_text("holding name", &self.name)?;
        if self.date.trim().is_empty() {
            return Err(Error::validation("holding date is required"));
        }
        let date = parse_date("holding date", &self.date)?;
        require_text("channelId", &self.channel_id)?;
        require_text("mention", &self.mention)?;
        Ok(date)
    }
}

/// Partial update: absent fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateHoldingInput {
    pub name: Option<String>,
    pub date: Option<String>,
    pub channel_id: Option<String>,
    pub mention: Option<String>,
}

impl UpdateHoldingInput {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            require_text("holding name", name)?;
        }
        if let Some(date) = &self.date {
            parse_date("holding date", date)?;
        }
        if let Some(channel_id) = &self.channel_id {
            require_text("channelId", channel_id)?;
        }
        if let Some(mention) = &self.mention {
            require_text("mention", mention)?;
        }
        Ok(())
    }

    pub fn apply(&self, holding: &mut Holding) -> Result<()> {
        if let Some(name) = &self.name {
            holding.name = name.clone();
        }
        if let Some(date) = &self.date {
            holding.date = parse_date("holding date", date)?;
        }
        if let Some(channel_id) = &self.channel_id {
            holding.channel_id = channel_id.clone();
        }
        if let Some(mention) = &self.mention {
            holding.mention = mention.clone();
        }
        Ok(())
    }
}
