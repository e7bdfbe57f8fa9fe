use super::{Storage, StorageError};
use chrono::Utc;
use common::model::schema::{Schema, SchemaMeta, StoredSchema};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

fn latest_schema_with(conn: &Connection, doc_id: &str) -> Result<Option<StoredSchema>, StorageError> {
    let row = conn
        .query_row(
            "SELECT id, doc_id, model_name, body, created_at FROM schemas
             WHERE doc_id = ?1 ORDER BY created_at DESC LIMIT 1",
            params![doc_id],
            |row| {
                Ok((
                    SchemaMeta {
                        id: row.get(0)?,
                        doc_id: row.get(1)?,
                        model_name: row.get(2)?,
                        created_at: row.get(4)?,
                    },
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((meta, body)) => Ok(Some(StoredSchema {
            schema: serde_json::from_str(&body)?,
            meta,
        })),
        None => Ok(None),
    }
}

impl Storage {
    /// The schema of a document, if one was created.
    pub fn latest_schema(&self, doc_id: &str) -> Result<Option<StoredSchema>, StorageError> {
        latest_schema_with(&self.connect()?, doc_id)
    }

    /// Stores `schema` unless the document already has one, and returns the
    /// schema kept for the document with whether this call created it.
    pub fn insert_schema_if_absent(
        &self,
        doc_id: &str,
        model_name: Option<&str>,
        schema: &Schema,
    ) -> Result<(StoredSchema, bool), StorageError> {
        let body = serde_json::to_string(schema)?;
        let conn = self.connect()?;
        let inserted = conn.execute(
            "INSERT INTO schemas (id, doc_id, model_name, body, created_at) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (doc_id) DO NOTHING",
            params![Uuid::new_v4().to_string(), doc_id, model_name, body, Utc::now()],
        )?;

        let stored = latest_schema_with(&conn, doc_id)?.ok_or_else(|| {
            StorageError::Corrupt(format!("schema for document {doc_id} vanished after insert"))
        })?;
        Ok((stored, inserted == 1))
    }

    /// Whether `schema_id` is the schema of `doc_id`.
    pub fn schema_belongs_to(&self, doc_id: &str, schema_id: &str) -> Result<bool, StorageError> {
        let conn = self.connect()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM schemas WHERE id = ?1 AND doc_id = ?2",
                params![schema_id, doc_id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_storage::{sample_document, temp_storage};
    use super::*;
    use common::model::schema::Group;
    use pretty_assertions::assert_eq;

    fn schema(title: &str) -> Schema {
        Schema {
            groups: vec![Group {
                id: "company".into(),
                title: title.into(),
                description: None,
                fields: vec![],
            }],
        }
    }

    #[test]
    fn first_insert_creates_and_later_inserts_return_it_unchanged() {
        let (_dir, storage) = temp_storage();
        storage.insert_document(&sample_document("doc-1")).unwrap();

        let (first, created) = storage
            .insert_schema_if_absent("doc-1", Some("model-a"), &schema("Company"))
            .unwrap();
        assert!(created);

        let (second, created_again) = storage
            .insert_schema_if_absent("doc-1", Some("model-b"), &schema("Other"))
            .unwrap();
        assert!(!created_again);
        assert_eq!(second, first);
        assert_eq!(second.schema.groups[0].title, "Company");
        assert_eq!(second.meta.model_name.as_deref(), Some("model-a"));
        assert_eq!(storage.latest_schema("doc-1").unwrap(), Some(first));
    }

    #[test]
    fn schema_ownership_is_checked_per_document() {
        let (_dir, storage) = temp_storage();
        storage.insert_document(&sample_document("doc-1")).unwrap();
        storage.insert_document(&sample_document("doc-2")).unwrap();
        let (stored, _) = storage.insert_schema_if_absent("doc-1", None, &schema("C")).unwrap();

        assert!(storage.schema_belongs_to("doc-1", &stored.meta.id).unwrap());
        assert!(!storage.schema_belongs_to("doc-2", &stored.meta.id).unwrap());
    }

    #[test]
    fn missing_schema_is_none() {
        let (_dir, storage) = temp_storage();
        assert_eq!(storage.latest_schema("doc-1").unwrap(), None);
    }
}
