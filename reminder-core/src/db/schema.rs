pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS default_tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id INTEGER NOT NULL REFERENCES events(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    days_before INTEGER NOT NULL CHECK (days_before BETWEEN 0 AND 36500),
    description TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS holdings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    event_id INTEGER NOT NULL REFERENCES events(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    date TEXT NOT NULL,
    channel_id TEXT NOT NULL,
    mention TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    holding_id INTEGER NOT NULL REFERENCES holdings(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    days_before INTEGER NOT NULL CHECK (days_before BETWEEN 0 AND 36500),
    description TEXT NOT NULL DEFAULT '',
    reminded INTEGER NOT NULL DEFAULT 0 CHECK (reminded IN (0, 1))
);

CREATE INDEX IF NOT EXISTS idx_default_tasks_event ON default_tasks(event_id);
CREATE INDEX IF NOT EXISTS idx_holdings_event ON holdings(event_id, date);
CREATE INDEX IF NOT EXISTS idx_tasks_holding ON tasks(holding_id);

-- The scheduler only ever scans unreminded rows
CREATE INDEX IF NOT EXISTS idx_tasks_unreminded ON tasks(holding_id) WHERE reminded = 0;
"#;
