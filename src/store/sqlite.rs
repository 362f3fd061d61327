//! SQLite record backend

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::StorageError;

use super::backend::RecordBackend;
use super::types::{PdfRecord, RecordSummary};

/// Row as stored in `pdf_files`
#[derive(Debug, sqlx::FromRow)]
struct PdfRow {
    id: String,
    name: String,
    size: i64,
    created: i64,
    last_accessed: Option<i64>,
    data: Vec<u8>,
    thumbnail: Option<String>,
}

/// `pdf_files` row without the file bytes
#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: String,
    name: String,
    size: i64,
    created: i64,
    last_accessed: Option<i64>,
    thumbnail: Option<String>,
}

impl TryFrom<PdfRow> for PdfRecord {
    type Error = StorageError;

    fn try_from(row: PdfRow) -> Result<Self, Self::Error> {
        let (size, created, last_accessed) =
            decode_metadata(&row.id, row.size, row.created, row.last_accessed)?;

        Ok(PdfRecord {
            id: row.id,
            name: row.name,
            size,
            created,
            last_accessed,
            data: Bytes::from(row.data),
            thumbnail: row.thumbnail,
        })
    }
}

impl TryFrom<SummaryRow> for RecordSummary {
    type Error = StorageError;

    fn try_from(row: SummaryRow) -> Result<Self, Self::Error> {
        let (size, created, last_accessed) =
            decode_metadata(&row.id, row.size, row.created, row.last_accessed)?;

        Ok(RecordSummary::new(row.id, row.name, size, created, last_accessed, row.thumbnail))
    }
}

type Metadata = (u64, DateTime<Utc>, Option<DateTime<Utc>>);

fn decode_metadata(
    id: &str,
    size: i64,
    created: i64,
    last_accessed: Option<i64>,
) -> Result<Metadata, StorageError> {
    let size = u64::try_from(size)
        .map_err(|_| StorageError::Corrupted(format!("negative size for {}", id)))?;
    let created = from_millis(created)
        .ok_or_else(|| StorageError::Corrupted(format!("invalid created time for {}", id)))?;
    let last_accessed = match last_accessed {
        Some(ms) => Some(from_millis(ms).ok_or_else(|| {
            StorageError::Corrupted(format!("invalid last accessed time for {}", id))
        })?),
        None => None,
    };

    Ok((size, created, last_accessed))
}

fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms)
}

/// Record backend persisting to the `pdf_files` table
#[derive(Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (and migrate) the database at `database_url`
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::db::create_pool(database_url).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl RecordBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn insert(&self, record: &PdfRecord) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO pdf_files (id, name, size, created, last_accessed, data, thumbnail)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(record.size as i64)
        .bind(record.created.timestamp_millis())
        .bind(record.last_accessed.map(|t| t.timestamp_millis()))
        .bind(&record.data[..])
        .bind(&record.thumbnail)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<PdfRecord>, StorageError> {
        let rows = sqlx::query_as::<_, PdfRow>(
            r#"
            SELECT id, name, size, created, last_accessed, data, thumbnail
            FROM pdf_files
            ORDER BY created ASC, rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PdfRecord::try_from).collect()
    }

    async fn fetch_summaries(&self) -> Result<Vec<RecordSummary>, StorageError> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT id, name, size, created, last_accessed, thumbnail
            FROM pdf_files
            ORDER BY created ASC, rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RecordSummary::try_from).collect()
    }

    async fn touch(&self, id: &str, at: DateTime<Utc>) -> Result<Option<PdfRecord>, StorageError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE pdf_files SET last_accessed = MAX(created, ?) WHERE id = ?")
            .bind(at.timestamp_millis())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let row = sqlx::query_as::<_, PdfRow>(
            r#"
            SELECT id, name, size, created, last_accessed, data, thumbnail
            FROM pdf_files
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        row.map(PdfRecord::try_from).transpose()
    }

    async fn remove(&self, id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM pdf_files WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM pdf_files")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn count(&self) -> Result<u64, StorageError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pdf_files")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn total_bytes(&self) -> Result<u64, StorageError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COALESCE(SUM(size), 0) FROM pdf_files")
            .fetch_one(&self.pool)
            .await?;

        Ok(total.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    async fn backend() -> SqliteBackend {
        SqliteBackend::connect("sqlite::memory:").await.unwrap()
    }

    fn record(id: &str) -> PdfRecord {
        let created = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        PdfRecord {
            id: id.to_string(),
            name: format!("{}.pdf", id),
            size: 4,
            created,
            last_accessed: Some(created),
            data: Bytes::from_static(b"%PDF"),
            thumbnail: Some("data:image/png;base64,AAAA".to_string()),
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch() {
        let backend = backend().await;
        backend.insert(&record("one")).await.unwrap();
        backend.insert(&record("two")).await.unwrap();

        let records = backend.fetch_all().await.unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["one", "two"]);
        assert_eq!(&records[0].data[..], b"%PDF");
        assert_eq!(records[0].created, record("one").created);
    }

    #[tokio::test]
    async fn test_fetch_orders_by_created() {
        let backend = backend().await;
        let mut late = record("late");
        late.created = late.created + chrono::Duration::hours(1);
        backend.insert(&late).await.unwrap();
        backend.insert(&record("early")).await.unwrap();

        let ids: Vec<_> = backend.fetch_all().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, ["early", "late"]);
    }

    #[tokio::test]
    async fn test_summaries_skip_file_bytes() {
        let backend = backend().await;
        let rec = record("meta");
        backend.insert(&rec).await.unwrap();

        let summaries = backend.fetch_summaries().await.unwrap();
        assert_eq!(summaries, vec![RecordSummary::from(&rec)]);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let backend = backend().await;
        backend.insert(&record("same")).await.unwrap();

        let result = backend.insert(&record("same")).await;
        assert!(matches!(result, Err(StorageError::DuplicateId(_))));
        assert_eq!(backend.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_touch_never_precedes_created() {
        let backend = backend().await;
        let rec = record("clock");
        backend.insert(&rec).await.unwrap();

        let earlier = rec.created - chrono::Duration::days(1);
        let touched = backend.touch("clock", earlier).await.unwrap().unwrap();
        assert_eq!(touched.last_accessed, Some(rec.created));

        let later = rec.created + chrono::Duration::hours(1);
        let touched = backend.touch("clock", later).await.unwrap().unwrap();
        assert_eq!(touched.last_accessed, Some(later));
    }

    #[tokio::test]
    async fn test_touch_missing() {
        let backend = backend().await;
        assert!(backend.touch("missing", Utc::now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupted_row() {
        let backend = backend().await;
        sqlx::query(
            "INSERT INTO pdf_files (id, name, size, created, data) VALUES ('bad', 'bad.pdf', -1, 0, x'00')",
        )
        .execute(&backend.pool)
        .await
        .unwrap();

        let result = backend.fetch_all().await;
        assert!(matches!(result, Err(StorageError::Corrupted(_))));
    }

    #[tokio::test]
    async fn test_totals_and_clear() {
        let backend = backend().await;
        backend.insert(&record("a")).await.unwrap();
        backend.insert(&record("b")).await.unwrap();

        assert_eq!(backend.count().await.unwrap(), 2);
        assert_eq!(backend.total_bytes().await.unwrap(), 8);
        assert_eq!(backend.clear().await.unwrap(), 2);
        assert_eq!(backend.total_bytes().await.unwrap(), 0);
        assert!(!backend.remove("a").await.unwrap());
    }
}
