//! SQL schema for the Carehub SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS shift_assignments (
    assignment_id TEXT PRIMARY KEY,
    family_id     TEXT NOT NULL,
    carer_id      TEXT,
    title         TEXT NOT NULL,
    weekdays      TEXT NOT NULL DEFAULT '[]',  -- JSON array, e.g. [\"Mon\",\"Thu\"]
    start_time    TEXT NOT NULL,               -- HH:MM:SS
    end_time      TEXT NOT NULL,               -- HH:MM:SS; < start_time if overnight
    is_recurring  INTEGER NOT NULL,
    active        INTEGER NOT NULL,
    created_at    TEXT NOT NULL                -- RFC 3339 UTC
);

-- Instances are only ever inserted by the generator.
-- The UNIQUE pair makes repeated generation for a range harmless.
CREATE TABLE IF NOT EXISTS shift_instances (
    instance_id         TEXT PRIMARY KEY,
    shift_assignment_id TEXT NOT NULL REFERENCES shift_assignments(assignment_id),
    scheduled_date      TEXT NOT NULL,          -- YYYY-MM-DD
    start_time          TEXT NOT NULL,
    end_time            TEXT NOT NULL,
    created_at          TEXT NOT NULL,
    UNIQUE (shift_assignment_id, scheduled_date)
);

CREATE INDEX IF NOT EXISTS assignments_family_idx ON shift_assignments(family_id);
CREATE INDEX IF NOT EXISTS instances_date_idx     ON shift_instances(scheduled_date);

PRAGMA user_version = 1;
";
