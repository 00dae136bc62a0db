//! SQL schema for the parley SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS people (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    name              TEXT NOT NULL UNIQUE,
    age               INTEGER NOT NULL,
    email             TEXT NOT NULL UNIQUE,
    password_hash     TEXT NOT NULL,   -- argon2 PHC string, never the raw value
    role              TEXT NOT NULL,   -- 'base' | 'admin'
    registration_date TEXT NOT NULL    -- ISO 8601 date; set once at creation
);

CREATE TABLE IF NOT EXISTS messages (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    content     TEXT NOT NULL,
    sent_at     TEXT NOT NULL,         -- ISO 8601 UTC; server-assigned, never updated
    sender_id   INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
    receiver_id INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS messages_sender_idx   ON messages(sender_id);
CREATE INDEX IF NOT EXISTS messages_receiver_idx ON messages(receiver_id);
CREATE INDEX IF NOT EXISTS messages_sent_at_idx  ON messages(sent_at);

PRAGMA user_version = 1;
";
