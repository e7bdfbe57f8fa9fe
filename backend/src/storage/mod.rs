//! SQLite persistence for documents, placeholders, schemas and answers, plus
//! the on-disk blob store holding raw template bytes.
//!
//! A fresh connection is opened per operation; SQLite serialises writers.

pub mod answers;
pub mod blobs;
pub mod documents;
pub mod schemas;

use blobs::BlobStore;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const MIGRATIONS: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id           TEXT PRIMARY KEY,
    filename     TEXT NOT NULL,
    storage_url  TEXT NOT NULL,
    mime         TEXT NOT NULL,
    size_bytes   INTEGER NOT NULL,
    blob_url     TEXT,
    parse_json   TEXT,
    preview_html TEXT,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS placeholders (
    id          TEXT PRIMARY KEY,
    document_id TEXT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    key         TEXT NOT NULL,
    label       TEXT NOT NULL,
    UNIQUE (document_id, key)
);

CREATE TABLE IF NOT EXISTS schemas (
    id         TEXT PRIMARY KEY,
    doc_id     TEXT NOT NULL UNIQUE REFERENCES documents(id) ON DELETE CASCADE,
    model_name TEXT,
    body       TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS answers (
    id         TEXT PRIMARY KEY,
    doc_id     TEXT NOT NULL UNIQUE REFERENCES documents(id) ON DELETE CASCADE,
    schema_id  TEXT REFERENCES schemas(id) ON DELETE SET NULL,
    body       TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("blob store error: {0}")]
    Io(#[from] std::io::Error),
    #[error("corrupt stored data: {0}")]
    Corrupt(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Corrupt(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct Storage {
    database_path: PathBuf,
    blobs: BlobStore,
}

impl Storage {
    /// Opens the database (creating tables when needed) and the blob directory.
    pub fn open(database_path: impl AsRef<Path>, blob_dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let storage = Self {
            database_path: database_path.as_ref().to_path_buf(),
            blobs: BlobStore::new(blob_dir)?,
        };
        storage.connect()?.execute_batch(MIGRATIONS)?;
        Ok(storage)
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    fn connect(&self) -> Result<Connection, StorageError> {
        let conn = Connection::open(&self.database_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(conn)
    }
}
