//! SQL schema for the sottobanco SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Contact profiles. Email is the natural key, looked up (not constrained)
-- so the find-or-create path stays byte-compatible with historical data.
CREATE TABLE IF NOT EXISTS users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name  TEXT NOT NULL,
    last_name   TEXT NOT NULL,
    email       TEXT NOT NULL,
    phone       TEXT,
    socials     TEXT,            -- JSON serialized to flat text
    created_at  TEXT NOT NULL    -- RFC 3339 UTC
);

-- (track, year) cohorts; seeded once at first boot, read-only afterwards.
CREATE TABLE IF NOT EXISTS classes (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    indirizzo  TEXT NOT NULL,
    anno       INTEGER NOT NULL
);

-- One row per submission, never deduplicated or shared.
CREATE TABLE IF NOT EXISTS books (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    title    TEXT NOT NULL,
    author   TEXT,
    edition  TEXT,
    isbn     TEXT,
    notes    TEXT
);

-- Deleting a referenced user or book nulls the reference; the announcement
-- itself stays.
CREATE TABLE IF NOT EXISTS announcements (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id          INTEGER REFERENCES users(id)   ON DELETE SET NULL,
    book_id          INTEGER REFERENCES books(id)   ON DELETE SET NULL,
    class_id         INTEGER REFERENCES classes(id) ON DELETE SET NULL,
    type             TEXT NOT NULL,                 -- 'sell' | 'buy' | 'exchange' (free text)
    price            REAL,
    condition        TEXT,
    description      TEXT,
    contact_visible  INTEGER NOT NULL DEFAULT 1,
    is_active        INTEGER NOT NULL DEFAULT 1,
    created_at       TEXT NOT NULL,                 -- RFC 3339 UTC
    expires_at       TEXT
);

CREATE INDEX IF NOT EXISTS announcements_class_idx   ON announcements(class_id);
CREATE INDEX IF NOT EXISTS announcements_created_idx ON announcements(created_at);
CREATE INDEX IF NOT EXISTS users_email_idx           ON users(email);

PRAGMA user_version = 1;
";
