use serde::{Deserialize, Serialize};

use super::require_text;
use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    #[serde(with = "super::id")]
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventInput {
    pub name: String,
}

impl CreateEventInput {
    pub fn validate(&self) -> Result<()> {
        require_text("event name", &self.name)
    }
}

/// Full replacement of an event's fields (`PUT`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateEventInput {
    pub name: String,
}

impl UpdateEventInput {
    pub fn validate(&self) -> Result<()> {
        require_text("event name", &self.name)
    }
}
