//! SQL schema for the thoughtlog SQLite store.
//!
//! Executed once when the store is opened. `foreign_keys` is a
//! per-connection setting, so it lives in [`CONNECTION_PRAGMAS`] and runs on
//! every connection instead.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS patients (
    code          TEXT PRIMARY KEY
                  CHECK (code GLOB 'P[0-9][0-9][0-9]' AND code <> 'P000'),
    name          TEXT NOT NULL,
    birth_date    TEXT,               -- YYYY-MM-DD or NULL
    sex           TEXT CHECK (sex IN ('F', 'M')),
    condition     TEXT,
    notes         TEXT,
    registered_on TEXT NOT NULL       -- YYYY-MM-DD
);

CREATE TABLE IF NOT EXISTS thoughts (
    code         TEXT PRIMARY KEY
                 CHECK (code GLOB 'P[0-9][0-9][0-9]-PS[0-9][0-9][0-9]'
                        AND substr(code, 8) <> '000'),
    patient_code TEXT NOT NULL REFERENCES patients(code) ON DELETE CASCADE,
    content      TEXT NOT NULL,
    created_at   TEXT NOT NULL,       -- RFC 3339 UTC
    CHECK (substr(code, 1, 4) = patient_code)
);

-- One row per measurement event; rows for the same thought and day
-- accumulate and are never merged.
CREATE TABLE IF NOT EXISTS dimensions (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    thought_code TEXT NOT NULL REFERENCES thoughts(code) ON DELETE CASCADE,
    recorded_on  TEXT NOT NULL,       -- YYYY-MM-DD
    occurrences  INTEGER NOT NULL CHECK (occurrences BETWEEN 0 AND 10),
    duration     INTEGER CHECK (duration BETWEEN 0 AND 60),
    intensity    INTEGER CHECK (intensity BETWEEN 0 AND 10)
);

CREATE INDEX IF NOT EXISTS thoughts_patient_idx   ON thoughts(patient_code);
CREATE INDEX IF NOT EXISTS dimensions_thought_idx ON dimensions(thought_code, recorded_on);

PRAGMA user_version = 1;
";

/// Run on every freshly opened connection.
pub const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;";
