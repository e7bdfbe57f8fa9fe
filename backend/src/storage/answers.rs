use super::{Storage, StorageError};
use chrono::{DateTime, Utc};
use common::model::answer::{AnswerBody, StoredAnswer};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

fn latest_answer_with(conn: &Connection, doc_id: &str) -> Result<Option<StoredAnswer>, StorageError> {
    let row = conn
        .query_row(
            "SELECT id, doc_id, schema_id, body, created_at, updated_at FROM answers
             WHERE doc_id = ?1 ORDER BY updated_at DESC LIMIT 1",
            params![doc_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, DateTime<Utc>>(4)?,
                    row.get::<_, DateTime<Utc>>(5)?,
                ))
            },
        )
        .optional()?;

    let Some((id, doc_id, schema_id, body, created_at, updated_at)) = row else {
        return Ok(None);
    };
    let body: AnswerBody = serde_json::from_str(&body)?;
    Ok(Some(StoredAnswer {
        id,
        doc_id,
        schema_id,
        body,
        created_at,
        updated_at,
    }))
}

impl Storage {
    /// The current answer set of a document.
    pub fn latest_answer(&self, doc_id: &str) -> Result<Option<StoredAnswer>, StorageError> {
        latest_answer_with(&self.connect()?, doc_id)
    }

    /// Replaces the answer set of a document, keeping a single row per document.
    /// A `None` schema reference keeps the previously stored one.
    pub fn upsert_answer(
        &self,
        doc_id: &str,
        body: &AnswerBody,
        schema_id: Option<&str>,
    ) -> Result<StoredAnswer, StorageError> {
        let json = serde_json::to_string(body)?;
        let now = Utc::now();
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO answers (id, doc_id, schema_id, body, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT (doc_id) DO UPDATE SET
                 body = excluded.body,
                 updated_at = excluded.updated_at,
                 schema_id = COALESCE(excluded.schema_id, answers.schema_id)",
            params![Uuid::new_v4().to_string(), doc_id, schema_id, json, now],
        )?;

        latest_answer_with(&conn, doc_id)?.ok_or_else(|| {
            StorageError::Corrupt(format!("answers for document {doc_id} vanished after upsert"))
        })
    }
}
