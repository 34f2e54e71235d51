//! SQL schema for the Cadence SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision so later migrations can be gated on it.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- AUTOINCREMENT: ids of deleted areas are never handed out again.
CREATE TABLE IF NOT EXISTS areas (
    id     INTEGER PRIMARY KEY AUTOINCREMENT,
    name   TEXT NOT NULL UNIQUE,
    color  TEXT
);

CREATE TABLE IF NOT EXISTS tags (
    id     INTEGER PRIMARY KEY AUTOINCREMENT,
    name   TEXT NOT NULL UNIQUE,
    color  TEXT
);

CREATE TABLE IF NOT EXISTS topics (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    title        TEXT NOT NULL,
    area_id      INTEGER,            -- weak reference to areas(id); not enforced
    start_date   TEXT NOT NULL,      -- YYYY-MM-DD
    tags         TEXT NOT NULL DEFAULT '',
    color        TEXT,
    description  TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS revisions (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    topic_id        INTEGER NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
    scheduled_date  TEXT NOT NULL,   -- YYYY-MM-DD
    status          TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'studied')),
    interval_days   INTEGER NOT NULL
);

-- Append-only ledger. topic_id is not a foreign key: sessions outlive the
-- topics they were recorded against.
CREATE TABLE IF NOT EXISTS study_sessions (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    topic_id          INTEGER NOT NULL,
    duration_seconds  INTEGER NOT NULL CHECK (duration_seconds >= 0),
    occurred_at       TEXT NOT NULL  -- local time, YYYY-MM-DD HH:MM:SS
);

CREATE INDEX IF NOT EXISTS revisions_topic_idx    ON revisions(topic_id);
CREATE INDEX IF NOT EXISTS revisions_date_idx     ON revisions(scheduled_date);
CREATE INDEX IF NOT EXISTS study_sessions_day_idx ON study_sessions(occurred_at);

PRAGMA user_version = 1;
";
