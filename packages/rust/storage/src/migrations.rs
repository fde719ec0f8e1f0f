//! SQL migration definitions for the corpus database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a batch of SQL statements.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: corpus_meta, documents",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Index-level settings fixed at creation (dimension, metric)
CREATE TABLE IF NOT EXISTS corpus_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Admitted documents; embedding is little-endian f32
CREATE TABLE IF NOT EXISTS documents (
    id           TEXT PRIMARY KEY,
    source_file  TEXT NOT NULL,
    summary      TEXT NOT NULL,
    skills       TEXT NOT NULL DEFAULT '',
    file_size    INTEGER NOT NULL,
    content_hash TEXT NOT NULL,
    embedding    BLOB NOT NULL,
    created_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_source_file ON documents(source_file);
CREATE INDEX IF NOT EXISTS idx_documents_content_hash ON documents(content_hash);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
