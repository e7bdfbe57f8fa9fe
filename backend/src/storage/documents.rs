use super::{Storage, StorageError};
use common::model::document::{Document, ParseResult};
use common::model::placeholder::Placeholder;
use rusqlite::{params, OptionalExtension, TransactionBehavior};
use uuid::Uuid;

const DOCUMENT_COLUMNS: &str = "id, filename, storage_url, mime, size_bytes, blob_url, parse_json, preview_html, created_at";

impl Storage {
    /// Inserts a document and one placeholder row per parsed placeholder in a
    /// single transaction.
    pub fn insert_document(&self, document: &Document) -> Result<(), StorageError> {
        let parse_json = document
            .parse_result
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO documents (id, filename, storage_url, mime, size_bytes, blob_url, parse_json, preview_html, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                document.id,
                document.filename,
                document.storage_url,
                document.mime,
                document.size_bytes as i64,
                document.blob_url,
                parse_json,
                document.preview_html,
                document.created_at,
            ],
        )?;

        if let Some(parsed) = &document.parse_result {
            let mut stmt = tx.prepare(
                "INSERT INTO placeholders (id, document_id, key, label) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (document_id, key) DO UPDATE SET label = excluded.label",
            )?;
            for placeholder in &parsed.placeholders {
                stmt.execute(params![
                    Uuid::new_v4().to_string(),
                    document.id,
                    placeholder.key,
                    placeholder.label,
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    pub fn get_document(&self, id: &str) -> Result<Option<Document>, StorageError> {
        let conn = self.connect()?;
        let row = conn
            .query_row(
                &format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1"),
                params![id],
                |row| {
                    Ok((
                        Document {
                            id: row.get(0)?,
                            filename: row.get(1)?,
                            storage_url: row.get(2)?,
                            mime: row.get(3)?,
                            size_bytes: row.get::<_, i64>(4)?.max(0) as u64,
                            blob_url: row.get(5)?,
                            parse_result: None,
                            preview_html: row.get(7)?,
                            created_at: row.get(8)?,
                        },
                        row.get::<_, Option<String>>(6)?,
                    ))
                },
            )
            .optional()?;

        let Some((mut document, parse_json)) = row else {
            return Ok(None);
        };
        document.parse_result = parse_json
            .map(|json| serde_json::from_str::<ParseResult>(&json))
            .transpose()?;
        Ok(Some(document))
    }

    pub fn document_exists(&self, id: &str) -> Result<bool, StorageError> {
        let conn = self.connect()?;
        let found = conn
            .query_row("SELECT 1 FROM documents WHERE id = ?1", params![id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    /// Placeholder rows of a document in insertion order.
    pub fn list_placeholders(&self, document_id: &str) -> Result<Vec<Placeholder>, StorageError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT key, label FROM placeholders WHERE document_id = ?1 ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![document_id], |row| {
            Ok(Placeholder {
                key: row.get(0)?,
                label: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn cache_preview(&self, id: &str, html: &str) -> Result<(), StorageError> {
        let conn = self.connect()?;
        conn.execute(
            "UPDATE documents SET preview_html = ?1 WHERE id = ?2",
            params![html, id],
        )?;
        Ok(())
    }

    /// Deletes a document and its dependent rows, returning the storage
    /// location of its bytes. The write lock is taken before the row is read.
    pub fn delete_document(&self, id: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let location: Option<String> = tx
            .query_row(
                "SELECT storage_url FROM documents WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        if location.is_some() {
            tx.execute("DELETE FROM documents WHERE id = ?1", params![id])?;
        }
        tx.commit()?;
        Ok(location)
    }
}
