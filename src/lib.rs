//! Checklist reminders for recurring events.
//!
//! Events own holdings (dated occurrences) and default tasks; holdings own
//! tasks. The HTTP API in [`api`] manages them, the [`scheduler`] posts a traQ
//! message once a task's lead time is reached, and [`channels`] serves the
//! cached, path-qualified traQ channel list.

pub mod api;
pub mod channels;
pub mod config;
pub mod error;
pub mod notify;
pub mod scheduler;
pub mod traq;

pub use reminder_core::{db, models};
