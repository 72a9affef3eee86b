//! Command-line and environment configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveTime;
use clap::{Args, Parser, Subcommand};
use reminder_core::db::TemplatePolicy;

use crate::scheduler::Trigger;

#[derive(Parser, Debug)]
#[command(name = "event-reminder")]
#[command(about = "Checklist reminders for recurring events, delivered to traQ channels")]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP API and the reminder scheduler (default)
    Serve,
    /// Run one reminder pass and exit
    Remind,
    /// Print the flattened traQ channel directory
    Channels,
}

#[derive(Args, Debug, Clone)]
pub struct Config {
    /// SQLite database file (defaults to the platform data directory)
    #[arg(long, env = "DATABASE_PATH", global = true)]
    pub database: Option<PathBuf>,

    /// Address for the HTTP API
    #[arg(long, env = "HOST", default_value = "0.0.0.0", global = true)]
    pub host: String,

    /// Port for the HTTP API
    #[arg(short, long, env = "PORT", default_value_t = 8080, global = true)]
    pub port: u16,

    /// traQ bot access token
    #[arg(long, env = "TRAQ_TOKEN", hide_env_values = true, global = true)]
    pub traq_token: Option<String>,

    /// traQ server base URL
    #[arg(long, env = "TRAQ_BASE_URL", default_value = "https://q.trap.jp", global = true)]
    pub traq_base_url: String,

    /// Reminder channel for holdings created without a channel id
    #[arg(long, env = "REMIND_CHANNEL_ID", global = true)]
    pub remind_channel_id: Option<String>,

    /// Run the scheduler every interval (e.g. `12h`, `30m`, `1h30m`) instead of daily
    #[arg(long, env = "REMIND_INTERVAL", value_parser = parse_interval, global = true)]
    pub remind_interval: Option<Duration>,

    /// Local wall-clock time of the daily reminder run (`HH:MM`)
    #[arg(long, env = "REMIND_AT", value_parser = parse_time_of_day, default_value = "08:00", global = true)]
    pub remind_at: NaiveTime,

    /// Where new holdings copy their tasks from: `event-defaults` or `carry-forward`
    #[arg(long, env = "TEMPLATE_POLICY", default_value = "event-defaults", global = true)]
    pub template_policy: TemplatePolicy,

    /// Upper bound for a single traQ request, in seconds
    #[arg(long, env = "SEND_TIMEOUT_SECS", default_value_t = 10, global = true)]
    pub send_timeout_secs: u64,
}

impl Config {
    pub fn traq_token(&self) -> anyhow::Result<&str> {
        self.traq_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .context("TRAQ_TOKEN is required (set the env var or pass --traq-token)")
    }

    pub fn trigger(&self) -> Trigger {
        match self.remind_interval {
            Some(period) => Trigger::Interval(period),
            None => Trigger::Daily(self.remind_at),
        }
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs.max(1))
    }
}

/// Parse durations such as `45s`, `30m`, `12h`, `1d` or `1h30m`.
pub fn parse_interval(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("interval is empty".to_string());
    }

    let mut total = 0u64;
    let mut digits = String::new();
    for c in s.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit = match c {
            's' => 1,
            'm' => 60,
            'h' => 3600,
            'd' => 86_400,
            _ => return Err(format!("unknown unit '{c}' in interval '{s}'")),
        };
        let value: u64 = digits
            .parse()
            .map_err(|_| format!("missing number before '{c}' in interval '{s}'"))?;
        total = value
            .checked_mul(unit)
            .and_then(|secs| total.checked_add(secs))
            .ok_or_else(|| format!("interval '{s}' is too large"))?;
        digits.clear();
    }
    if !digits.is_empty() {
        return Err(format!("interval '{s}' needs a unit (s, m, h or d)"));
    }
    if total == 0 {
        return Err("interval must be greater than zero".to_string());
    }
    Ok(Duration::from_secs(total))
}

pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|_| format!("expected HH:MM, got '{s}'"))
}
