//! SQLite-backed metadata index.
//!
//! One `records` table, schema created on open. Timestamps are stored as
//! fixed-width RFC 3339 text so lexical ordering matches chronological
//! ordering.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

use crate::error::IndexError;
use crate::store::BlobId;
use crate::types::{ImageRecord, RecordId};

use super::{MetadataIndex, RecordFilter};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS records (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    file_name        TEXT NOT NULL,
    alt_text         TEXT NOT NULL,
    category         TEXT NOT NULL,
    subcategory      TEXT,
    sub_subcategory  TEXT,
    thumbnail_blob_id TEXT NOT NULL,
    full_blob_id     TEXT NOT NULL,
    placeholder      TEXT NOT NULL,
    width            INTEGER,
    height           INTEGER,
    format           TEXT,
    created_at       TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_records_categories
    ON records (category, subcategory, sub_subcategory);
";

/// Metadata index over a local SQLite database.
#[derive(Debug)]
pub struct SqliteIndex {
    conn: Mutex<Connection>,
}

impl SqliteIndex {
    /// Open (creating if needed) the index at `path`.
    ///
    /// A failure here is a connection error: the run must abort before
    /// any file is processed.
    pub fn open(path: &Path) -> Result<Self, IndexError> {
        let conn = Connection::open(path).map_err(|source| IndexError::Connection { source })?;
        conn.execute_batch(SCHEMA)
            .map_err(|source| IndexError::Connection { source })?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory index, used by tests.
    pub fn open_in_memory() -> Result<Self, IndexError> {
        let conn = Connection::open_in_memory().map_err(|source| IndexError::Connection { source })?;
        conn.execute_batch(SCHEMA)
            .map_err(|source| IndexError::Connection { source })?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ImageRecord> {
        Ok(ImageRecord {
            id: Some(RecordId(row.get(0)?)),
            file_name: row.get(1)?,
            alt_text: row.get(2)?,
            category: row.get(3)?,
            subcategory: row.get(4)?,
            sub_subcategory: row.get(5)?,
            thumbnail_blob_id: parse_blob_id(row.get::<_, String>(6)?, 6)?,
            full_blob_id: parse_blob_id(row.get::<_, String>(7)?, 7)?,
            placeholder: row.get(8)?,
            width: row.get::<_, Option<i64>>(9)?.map(|v| v as u32),
            height: row.get::<_, Option<i64>>(10)?.map(|v| v as u32),
            format: row.get(11)?,
            created_at: parse_timestamp(row.get::<_, String>(12)?, 12)?,
        })
    }
}

fn parse_blob_id(raw: String, column: usize) -> rusqlite::Result<BlobId> {
    BlobId::parse(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_timestamp(raw: String, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

/// WHERE clause and bound values for a filter.
fn where_clause(filter: &RecordFilter) -> (String, Vec<String>) {
    let mut clauses = Vec::new();
    let mut values = Vec::new();
    if let Some(category) = &filter.category {
        clauses.push("category = ?");
        values.push(category.clone());
    }
    if let Some(subcategory) = &filter.subcategory {
        clauses.push("subcategory = ?");
        values.push(subcategory.clone());
    }
    if let Some(sub_subcategory) = &filter.sub_subcategory {
        clauses.push("sub_subcategory = ?");
        values.push(sub_subcategory.clone());
    }
    let sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };
    (sql, values)
}

#[async_trait]
impl MetadataIndex for SqliteIndex {
    async fn insert(&self, record: &ImageRecord) -> Result<RecordId, IndexError> {
        let conn = self.conn.lock().map_err(|_| IndexError::Poisoned)?;
        conn.execute(
            "INSERT INTO records (file_name, alt_text, category, subcategory, sub_subcategory, \
             thumbnail_blob_id, full_blob_id, placeholder, width, height, format, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            rusqlite::params![
                record.file_name,
                record.alt_text,
                record.category,
                record.subcategory,
                record.sub_subcategory,
                record.thumbnail_blob_id.to_string(),
                record.full_blob_id.to_string(),
                record.placeholder,
                record.width.map(|v| v as i64),
                record.height.map(|v| v as i64),
                record.format,
                record
                    .created_at
                    .to_rfc3339_opts(SecondsFormat::Micros, true),
            ],
        )
        .map_err(|source| IndexError::Write { source })?;
        Ok(RecordId(conn.last_insert_rowid()))
    }

    async fn query(&self, filter: &RecordFilter) -> Result<Vec<ImageRecord>, IndexError> {
        let conn = self.conn.lock().map_err(|_| IndexError::Poisoned)?;
        let (where_sql, values) = where_clause(filter);
        let mut sql = format!(
            "SELECT id, file_name, alt_text, category, subcategory, sub_subcategory, \
             thumbnail_blob_id, full_blob_id, placeholder, width, height, format, created_at \
             FROM records{where_sql} ORDER BY created_at DESC, id DESC"
        );
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|source| IndexError::Query { source })?;
        let rows = stmt
            .query_map(
                rusqlite::params_from_iter(values.iter().map(String::as_str)),
                Self::row_to_record,
            )
            .map_err(|source| IndexError::Query { source })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|source| IndexError::Query { source })?);
        }
        Ok(records)
    }

    async fn count(&self, filter: &RecordFilter) -> Result<u64, IndexError> {
        let conn = self.conn.lock().map_err(|_| IndexError::Poisoned)?;
        let (where_sql, values) = where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM records{where_sql}");
        let count: i64 = conn
            .query_row(
                &sql,
                rusqlite::params_from_iter(values.iter().map(String::as_str)),
                |row| row.get(0),
            )
            .map_err(|source| IndexError::Query { source })?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_record(file_name: &str, categories: (&str, Option<&str>, Option<&str>)) -> ImageRecord {
        ImageRecord {
            id: None,
            file_name: file_name.to_string(),
            alt_text: crate::types::alt_text_from_file_name(file_name),
            category: categories.0.to_string(),
            subcategory: categories.1.map(str::to_string),
            sub_subcategory: categories.2.map(str::to_string),
            thumbnail_blob_id: BlobId::parse("11111111111111111111111111111111").unwrap(),
            full_blob_id: BlobId::parse("22222222222222222222222222222222").unwrap(),
            placeholder: "data:image/jpeg;base64,AAAA".to_string(),
            width: Some(1920),
            height: Some(1080),
            format: Some("jpeg".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_open_unusable_path_is_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        // The database cannot be created under a regular file.
        let err = SqliteIndex::open(&blocker.join("index.db")).unwrap_err();
        assert!(matches!(err, IndexError::Connection { .. }));
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let index = SqliteIndex::open_in_memory().unwrap();
        let a = index
            .insert(&sample_record("a.jpg", ("Ribbons", None, None)))
            .await
            .unwrap();
        let b = index
            .insert(&sample_record("b.jpg", ("Ribbons", None, None)))
            .await
            .unwrap();
        assert!(b.0 > a.0);
    }

    #[tokio::test]
    async fn test_query_filters_by_hierarchy() {
        let index = SqliteIndex::open_in_memory().unwrap();
        index
            .insert(&sample_record("a.jpg", ("Ribbons", Some("Velvet"), None)))
            .await
            .unwrap();
        index
            .insert(&sample_record("b.jpg", ("Ribbons", Some("Satin"), None)))
            .await
            .unwrap();
        index
            .insert(&sample_record("c.jpg", ("Buttons", None, None)))
            .await
            .unwrap();

        let filter = RecordFilter {
            category: Some("Ribbons".to_string()),
            ..Default::default()
        };
        assert_eq!(index.query(&filter).await.unwrap().len(), 2);

        let filter = RecordFilter {
            category: Some("Ribbons".to_string()),
            subcategory: Some("Velvet".to_string()),
            ..Default::default()
        };
        let records = index.query(&filter).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_name, "a.jpg");
        assert!(records[0].id.is_some());
    }

    #[tokio::test]
    async fn test_query_sorts_newest_first_with_limit() {
        let index = SqliteIndex::open_in_memory().unwrap();

        let mut old = sample_record("old.jpg", ("Ribbons", None, None));
        old.created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut new = sample_record("new.jpg", ("Ribbons", None, None));
        new.created_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        index.insert(&old).await.unwrap();
        index.insert(&new).await.unwrap();

        let records = index.query(&RecordFilter::default()).await.unwrap();
        assert_eq!(records[0].file_name, "new.jpg");
        assert_eq!(records[1].file_name, "old.jpg");

        let filter = RecordFilter {
            limit: Some(1),
            ..Default::default()
        };
        let records = index.query(&filter).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_name, "new.jpg");
    }

    #[tokio::test]
    async fn test_count_ignores_limit() {
        let index = SqliteIndex::open_in_memory().unwrap();
        for name in ["a.jpg", "b.jpg", "c.jpg"] {
            index
                .insert(&sample_record(name, ("Ribbons", None, None)))
                .await
                .unwrap();
        }
        let filter = RecordFilter {
            limit: Some(1),
            ..Default::default()
        };
        assert_eq!(index.count(&filter).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_roundtrip_preserves_fields() {
        let index = SqliteIndex::open_in_memory().unwrap();
        let record = sample_record("red-ribbon.jpg", ("Ribbons", Some("Velvet"), Some("Wide")));
        index.insert(&record).await.unwrap();

        let out = &index.query(&RecordFilter::default()).await.unwrap()[0];
        assert_eq!(out.alt_text, "red ribbon");
        assert_eq!(out.sub_subcategory.as_deref(), Some("Wide"));
        assert_eq!(out.thumbnail_blob_id, record.thumbnail_blob_id);
        assert_eq!(out.full_blob_id, record.full_blob_id);
        assert_eq!(out.width, Some(1920));
        assert_eq!(out.format.as_deref(), Some("jpeg"));
    }
}
