// Document store client over SQLx. Models the hosted schemaless database: one
// generic table of JSON documents grouped into named collections, queried by
// equality filters only. No native sort is leveraged; ordering is always the
// caller's job.

use anyhow::Result;
use chrono::Utc;
use serde_json::Value;
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;

pub mod seed;

/// Collection names, mirroring the hosted database layout.
pub const REVIEWS: &str = "reviews";
pub const USERS: &str = "users";
pub const CONTACT_MESSAGES: &str = "contactMessages";
/// Legacy sample-seed collection; unused by the primary read path.
pub const MOVIES: &str = "movies";

/// A stored document plus its store-level metadata.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub collection: String,
    pub data: Value,
    pub created: i64,
    pub updated: i64,
}

// Async document database with SQLx connection pool.
pub struct DocumentStore {
    pub pool: SqlitePool,
}

impl DocumentStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url).await?;
        Ok(DocumentStore { pool })
    }

    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                id TEXT NOT NULL,
                collection TEXT NOT NULL,
                data TEXT NOT NULL,
                created INTEGER NOT NULL,
                updated INTEGER NOT NULL,
                PRIMARY KEY(collection, id)
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a document with a store-assigned id. Returns the new id.
    pub async fn insert(&self, collection: &str, data: &Value) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO documents (id, collection, data, created, updated) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(collection)
        .bind(data.to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Create or replace a document under a caller-chosen id. The original
    /// creation time is preserved on replace.
    pub async fn put(&self, collection: &str, id: &str, data: &Value) -> Result<()> {
        let now = Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO documents (id, collection, data, created, updated) VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(collection, id)
             DO UPDATE SET data = excluded.data, updated = excluded.updated",
        )
        .bind(id)
        .bind(collection)
        .bind(data.to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Merge top-level fields of `patch` into an existing document. Fails when
    /// the document does not exist; callers that want create-or-update use
    /// [`put`](Self::put).
    pub async fn merge(&self, collection: &str, id: &str, patch: &Value) -> Result<()> {
        let existing = self
            .get(collection, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("No document {} in {}", id, collection))?;

        let mut data = existing.data;
        if let (Some(target), Some(fields)) = (data.as_object_mut(), patch.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }

        let now = Utc::now().timestamp();
        sqlx::query("UPDATE documents SET data = ?, updated = ? WHERE collection = ? AND id = ?")
            .bind(data.to_string())
            .bind(now)
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let row = sqlx::query(
            "SELECT id, collection, data, created, updated FROM documents
             WHERE collection = ? AND id = ?",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(row_to_document).transpose()
    }

    pub async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetch every document in a collection whose `field` equals `value`.
    /// Equality filters are the only query shape the store supports; results
    /// come back in storage order.
    pub async fn find_eq(&self, collection: &str, field: &str, value: &str) -> Result<Vec<Document>> {
        let path = format!("$.{}", field);
        let rows = sqlx::query(
            "SELECT id, collection, data, created, updated FROM documents
             WHERE collection = ? AND json_extract(data, ?) = ?",
        )
        .bind(collection)
        .bind(&path)
        .bind(value)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_document).collect()
    }

    pub async fn count(&self, collection: &str) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM documents WHERE collection = ?")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}

fn row_to_document(row: sqlx::sqlite::SqliteRow) -> Result<Document> {
    let raw: String = row.get("data");
    Ok(Document {
        id: row.get("id"),
        collection: row.get("collection"),
        data: serde_json::from_str(&raw)?,
        created: row.get("created"),
        updated: row.get("updated"),
    })
}
