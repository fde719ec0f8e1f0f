//! libSQL-backed document corpus.
//!
//! The [`Storage`] struct wraps a local libSQL database holding every admitted
//! document: its summary, skills, upload metadata, and summary embedding.
//! Similarity search is a brute-force cosine scan over all stored vectors,
//! which is adequate for a corpus of course submissions.
//!
//! **Access rules:**
//! - The HTTP service and `srsguard check`: read-write via [`Storage::open`]
//! - `srsguard corpus ...` inspection commands: read-only via [`Storage::open_readonly`]

mod migrations;
pub mod similarity;

use std::path::Path;

use chrono::{DateTime, Utc};
use libsql::{Connection, Database, params};
use srsguard_shared::{CorpusEntry, Result, SimilarityMatch, SrsGuardError, SubmittedDocument};

use crate::similarity::{cosine_similarity, decode_vector, encode_vector};

/// Metric recorded in `corpus_meta`. Scores returned by [`Storage::search`]
/// are cosine similarities.
const METRIC: &str = "cosine";

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    dimension: usize,
    readonly: bool,
}

impl Storage {
    /// Open or create a corpus at `path` in read-write mode.
    ///
    /// A new corpus records `dimension`; reopening an existing corpus with a
    /// different dimension is a config error.
    pub async fn open(path: &Path, dimension: usize) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SrsGuardError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(db_err)?;

        let conn = db.connect().map_err(db_err)?;

        let storage = Self {
            db,
            conn,
            dimension,
            readonly: false,
        };
        storage.run_migrations().await?;
        storage.ensure_index_settings().await?;
        Ok(storage)
    }

    /// Open an existing corpus at `path` in read-only mode.
    ///
    /// The dimension is taken from the corpus itself.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SrsGuardError::Storage(format!(
                "no corpus database at {}",
                path.display()
            )));
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(db_err)?;

        let conn = db.connect().map_err(db_err)?;

        let mut storage = Self {
            db,
            conn,
            dimension: 0,
            readonly: true,
        };
        storage.dimension = storage
            .get_meta("dimension")
            .await?
            .and_then(|d| d.parse().ok())
            .ok_or_else(|| SrsGuardError::Storage("corpus has no recorded dimension".into()))?;
        Ok(storage)
    }

    /// Embedding dimension this corpus accepts.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        SrsGuardError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Record dimension and metric on first open; verify them afterwards.
    async fn ensure_index_settings(&self) -> Result<()> {
        match self.get_meta("dimension").await? {
            None => {
                self.set_meta("dimension", &self.dimension.to_string()).await?;
                self.set_meta("metric", METRIC).await?;
                tracing::info!(dimension = self.dimension, metric = METRIC, "created corpus index");
                Ok(())
            }
            Some(stored) if stored == self.dimension.to_string() => Ok(()),
            Some(stored) => Err(SrsGuardError::config(format!(
                "corpus was created with dimension {stored}, but {} is configured",
                self.dimension
            ))),
        }
    }

    async fn get_meta(&self, key: &str) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query("SELECT value FROM corpus_meta WHERE key = ?1", params![key])
            .await
            .map_err(db_err)?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row.get::<String>(0).map_err(db_err)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }

    async fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.check_writable()?;
        self.conn
            .execute(
                "INSERT INTO corpus_meta (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(SrsGuardError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    fn check_dimension(&self, len: usize) -> Result<()> {
        if len != self.dimension {
            return Err(SrsGuardError::Storage(format!(
                "vector has dimension {len}, corpus expects {}",
                self.dimension
            )));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Document operations
    // -----------------------------------------------------------------------

    /// Insert an admitted document.
    pub async fn insert_document(&self, doc: &SubmittedDocument) -> Result<()> {
        self.check_writable()?;
        self.check_dimension(doc.embedding.len())?;
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO documents (id, source_file, summary, skills, file_size, content_hash, embedding, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    doc.id.to_string(),
                    doc.source_file.as_str(),
                    doc.summary.as_str(),
                    doc.skills.as_str(),
                    doc.file_size as i64,
                    doc.content_hash.as_str(),
                    encode_vector(&doc.embedding),
                    now.as_str(),
                ],
            )
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// The `k` stored documents most similar to `query`, best first.
    ///
    /// Equal scores keep insertion order.
    pub async fn search(&self, query: &[f32], k: usize) -> Result<Vec<SimilarityMatch>> {
        self.check_dimension(query.len())?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let rows = self
            .conn
            .query(
                "SELECT source_file, embedding FROM documents ORDER BY rowid",
                params![],
            )
            .await
            .map_err(db_err)?;

        rank_rows(rows, query, k).await
    }

    /// Number of stored documents.
    pub async fn count_documents(&self) -> Result<u64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM documents", params![])
            .await
            .map_err(db_err)?;

        match rows.next().await {
            Ok(Some(row)) => Ok(row.get::<i64>(0).unwrap_or(0).max(0) as u64),
            Ok(None) => Ok(0),
            Err(e) => Err(db_err(e)),
        }
    }

    /// Metadata of every stored document, oldest first.
    pub async fn list_documents(&self) -> Result<Vec<CorpusEntry>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, source_file, skills, file_size, content_hash, created_at
                 FROM documents ORDER BY rowid",
                params![],
            )
            .await
            .map_err(db_err)?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await.map_err(db_err)? {
            results.push(row_to_entry(&row)?);
        }
        Ok(results)
    }
}

/// Score `(source_file, embedding)` rows against `query` and keep the best `k`.
///
/// A row error aborts the whole search; a partial ranking is never returned.
async fn rank_rows(
    mut rows: libsql::Rows,
    query: &[f32],
    k: usize,
) -> Result<Vec<SimilarityMatch>> {
    let mut scored = Vec::new();
    while let Some(row) = rows.next().await.map_err(db_err)? {
        let source_file: String = row.get(0).map_err(db_err)?;
        let blob: Vec<u8> = row.get(1).map_err(db_err)?;
        let Some(vector) = decode_vector(&blob).filter(|v| v.len() == query.len()) else {
            tracing::warn!(%source_file, "skipping stored document with malformed embedding");
            continue;
        };
        scored.push(SimilarityMatch::new(source_file, cosine_similarity(query, &vector)));
    }

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(k);
    Ok(scored)
}

fn db_err(e: libsql::Error) -> SrsGuardError {
    SrsGuardError::Storage(e.to_string())
}

/// Convert a database row to a [`CorpusEntry`].
fn row_to_entry(row: &libsql::Row) -> Result<CorpusEntry> {
    let created_at: String = row.get(5).map_err(db_err)?;
    Ok(CorpusEntry {
        id: row.get::<String>(0).map_err(db_err)?,
        source_file: row.get::<String>(1).map_err(db_err)?,
        skills: row.get::<String>(2).map_err(db_err)?,
        file_size: row.get::<i64>(3).map_err(db_err)? as u64,
        content_hash: row.get::<String>(4).map_err(db_err)?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| SrsGuardError::Storage(format!("invalid created_at: {e}")))?,
    })
}
