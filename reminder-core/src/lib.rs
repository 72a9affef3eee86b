//! Core library for event-reminder.
//!
//! This crate provides the domain models, the SQLite persistence gateway and
//! the task template engine, independent of any transport layer (HTTP, chat
//! platform, scheduler).
//!
//! # Usage
//!
//! ```no_run
//! use reminder_core::db::{Database, HoldingFilter};
//! use reminder_core::models::*;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let holdings = db.list_holdings(HoldingFilter::All)?;
//! # Ok::<(), reminder_core::Error>(())
//! ```

pub mod db;
pub mod error;
pub mod models;

// Re-export commonly used types at crate root
pub use db::Database;
pub use error::{Error, Result};
