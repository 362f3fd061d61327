//! In-memory record backend
//!
//! Non-durable; contents are lost when the process exits.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::error::StorageError;

use super::backend::RecordBackend;
use super::types::{PdfRecord, RecordSummary};

#[derive(Default)]
struct MemoryInner {
    /// Record ID -> (insertion sequence, record)
    records: HashMap<String, (u64, PdfRecord)>,
    next_seq: u64,
}

impl MemoryInner {
    /// Records ordered by creation time, then insertion sequence
    fn ordered(&self) -> impl Iterator<Item = &PdfRecord> {
        let mut entries: Vec<_> = self.records.values().collect();
        entries.sort_by_key(|(seq, record)| (record.created, *seq));
        entries.into_iter().map(|(_, record)| record)
    }
}

/// Record backend holding everything in a process-local map
#[derive(Default)]
pub struct MemoryBackend {
    inner: RwLock<MemoryInner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, record: &PdfRecord) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        if inner.records.contains_key(&record.id) {
            return Err(StorageError::DuplicateId(record.id.clone()));
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.records.insert(record.id.clone(), (seq, record.clone()));
        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<PdfRecord>, StorageError> {
        let inner = self.inner.read();
        Ok(inner.ordered().map(PdfRecord::clone).collect())
    }

    async fn fetch_summaries(&self) -> Result<Vec<RecordSummary>, StorageError> {
        let inner = self.inner.read();
        Ok(inner.ordered().map(RecordSummary::from).collect())
    }

    async fn touch(&self, id: &str, at: DateTime<Utc>) -> Result<Option<PdfRecord>, StorageError> {
        let mut inner = self.inner.write();
        Ok(inner.records.get_mut(id).map(|(_, record)| {
            record.last_accessed = Some(at.max(record.created));
            record.clone()
        }))
    }

    async fn remove(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self.inner.write().records.remove(id).is_some())
    }

    async fn clear(&self) -> Result<u64, StorageError> {
        let mut inner = self.inner.write();
        let removed = inner.records.len() as u64;
        inner.records.clear();
        Ok(removed)
    }

    async fn count(&self) -> Result<u64, StorageError> {
        Ok(self.inner.read().records.len() as u64)
    }

    async fn total_bytes(&self) -> Result<u64, StorageError> {
        Ok(self.inner.read().records.values().map(|(_, r)| r.size).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn record(id: &str, size: u64) -> PdfRecord {
        PdfRecord {
            id: id.to_string(),
            name: format!("{}.pdf", id),
            size,
            created: Utc::now(),
            last_accessed: None,
            data: Bytes::from(vec![0u8; size as usize]),
            thumbnail: None,
        }
    }

    #[tokio::test]
    async fn test_insertion_order_survives_removal() {
        let backend = MemoryBackend::new();
        for id in ["c", "a", "b"] {
            backend.insert(&record(id, 1)).await.unwrap();
        }
        backend.remove("a").await.unwrap();
        backend.insert(&record("a", 1)).await.unwrap();

        let ids: Vec<_> = backend
            .fetch_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, ["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_fetch_orders_by_created() {
        let backend = MemoryBackend::new();
        let mut late = record("late", 1);
        late.created = Utc::now() + chrono::Duration::hours(1);
        backend.insert(&late).await.unwrap();
        backend.insert(&record("early", 1)).await.unwrap();

        let ids: Vec<_> = backend.fetch_all().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, ["early", "late"]);

        let summary_ids: Vec<_> = backend
            .fetch_summaries()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(summary_ids, ids);
    }

    #[tokio::test]
    async fn test_fetch_shares_bytes() {
        let backend = MemoryBackend::new();
        let rec = record("shared", 16);
        backend.insert(&rec).await.unwrap();

        let fetched = backend.fetch_all().await.unwrap().remove(0);
        assert_eq!(fetched.data.as_ptr(), rec.data.as_ptr());
    }

    #[tokio::test]
    async fn test_duplicate_id() {
        let backend = MemoryBackend::new();
        backend.insert(&record("x", 1)).await.unwrap();
        assert!(matches!(
            backend.insert(&record("x", 1)).await,
            Err(StorageError::DuplicateId(_))
        ));
    }

    #[tokio::test]
    async fn test_totals() {
        let backend = MemoryBackend::new();
        backend.insert(&record("a", 10)).await.unwrap();
        backend.insert(&record("b", 5)).await.unwrap();

        assert_eq!(backend.count().await.unwrap(), 2);
        assert_eq!(backend.total_bytes().await.unwrap(), 15);
        assert_eq!(backend.clear().await.unwrap(), 2);
        assert_eq!(backend.count().await.unwrap(), 0);
    }
}
