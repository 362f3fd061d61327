//! Storage backend trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StorageError;

use super::types::{PdfRecord, RecordSummary};

/// Persistence engine behind a [`RecordStore`](super::RecordStore).
///
/// Each method is atomic on its own; there are no cross-call transactions.
#[async_trait]
pub trait RecordBackend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Persist a new record. Fails with `DuplicateId` if the ID is taken.
    async fn insert(&self, record: &PdfRecord) -> Result<(), StorageError>;

    /// All records, oldest first
    async fn fetch_all(&self) -> Result<Vec<PdfRecord>, StorageError>;

    /// Metadata of all records in `fetch_all` order, without reading file bytes
    async fn fetch_summaries(&self) -> Result<Vec<RecordSummary>, StorageError>;

    /// Set `last_accessed` to `at` (never earlier than `created`) and return
    /// the updated record, or `None` if no record has this ID.
    async fn touch(&self, id: &str, at: DateTime<Utc>) -> Result<Option<PdfRecord>, StorageError>;

    /// Remove a record. Returns whether anything was removed.
    async fn remove(&self, id: &str) -> Result<bool, StorageError>;

    /// Remove every record, returning how many were removed
    async fn clear(&self) -> Result<u64, StorageError>;

    /// Number of stored records
    async fn count(&self) -> Result<u64, StorageError>;

    /// Sum of the `size` of all stored records
    async fn total_bytes(&self) -> Result<u64, StorageError>;
}
