//! PDF record store
//!
//! Durable persistence of uploaded PDF files and their metadata.
//!
//! # Components
//!
//! - [`RecordStore`]: Insert, lookup, search, delete. Owns thumbnail
//!   generation, quota enforcement and change notifications.
//! - [`RecordBackend`]: Storage engine seam
//!   - [`SqliteBackend`]: `pdf_files` table in a local SQLite database
//!   - [`MemoryBackend`]: Process-local map for ephemeral runs and tests

mod backend;
mod memory;
mod sqlite;
mod types;

pub use backend::RecordBackend;
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;
pub use types::*;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, SubsecRound, Utc};
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use crate::config::{StorageBackend, StorageConfig, ThumbnailConfig};
use crate::error::StorageError;
use crate::thumbnail::ThumbnailGenerator;

/// Buffered change events per subscriber before lagging
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// The record store. Construct one and share it; there is no global instance.
pub struct RecordStore {
    backend: Arc<dyn RecordBackend>,
    thumbnails: ThumbnailGenerator,
    quota_bytes: u64,
    /// Serialises the quota check with the insert that follows it
    insert_lock: Mutex<()>,
    revision: AtomicU64,
    events: broadcast::Sender<StoreEvent>,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn RecordBackend>, thumbnails: ThumbnailGenerator, quota_bytes: u64) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            backend,
            thumbnails,
            quota_bytes,
            insert_lock: Mutex::new(()),
            revision: AtomicU64::new(0),
            events,
        }
    }

    /// Non-durable store with default thumbnails and no quota
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()), ThumbnailGenerator::default(), 0)
    }

    /// Build the store described by the configuration
    pub async fn open(storage: &StorageConfig, thumbnails: ThumbnailConfig) -> Result<Self, StorageError> {
        let backend: Arc<dyn RecordBackend> = match storage.backend {
            StorageBackend::Sqlite => Arc::new(SqliteBackend::connect(&storage.database_url).await?),
            StorageBackend::Memory => Arc::new(MemoryBackend::new()),
        };

        tracing::info!(
            backend = backend.name(),
            quota_bytes = storage.quota_bytes,
            "Record store opened"
        );

        Ok(Self::new(backend, ThumbnailGenerator::new(thumbnails), storage.quota_bytes))
    }

    /// Store a new PDF and return the persisted record
    pub async fn insert(&self, data: Bytes, name: &str, size: u64) -> Result<PdfRecord, StorageError> {
        let thumbnail = self.render_thumbnail(name, size).await;

        let _guard = self.insert_lock.lock().await;

        if self.quota_bytes > 0 {
            let used = self.backend.total_bytes().await?;
            if used.saturating_add(size) > self.quota_bytes {
                return Err(StorageError::QuotaExceeded {
                    used,
                    requested: size,
                    quota: self.quota_bytes,
                });
            }
        }

        let now = now_millis();
        let record = PdfRecord {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            size,
            created: now,
            last_accessed: Some(now),
            data,
            thumbnail: Some(thumbnail),
        };

        self.backend.insert(&record).await?;

        tracing::info!(
            record_id = %record.id,
            file_name = %record.name,
            size = record.size,
            backend = self.backend.name(),
            "PDF stored"
        );

        self.publish(StoreEvent::Inserted {
            id: record.id.clone(),
            name: record.name.clone(),
        });

        Ok(record)
    }

    /// All records in insertion order
    pub async fn get_all(&self) -> Result<Vec<PdfRecord>, StorageError> {
        self.backend.fetch_all().await
    }

    /// Metadata of all records, ordered by `key`
    pub async fn list(&self, key: SortKey, order: SortOrder) -> Result<Vec<RecordSummary>, StorageError> {
        let mut summaries = self.backend.fetch_summaries().await?;
        sort_records(&mut summaries, key, order);
        Ok(summaries)
    }

    /// Look up a record, marking it as accessed now
    pub async fn get_by_id(&self, id: &str) -> Result<Option<PdfRecord>, StorageError> {
        let record = self.backend.touch(id, now_millis()).await?;
        if record.is_none() {
            tracing::debug!(record_id = %id, "PDF not found");
        }
        Ok(record)
    }

    /// Delete a record. Deleting an unknown ID is not an error.
    pub async fn delete_by_id(&self, id: &str) -> Result<bool, StorageError> {
        let removed = self.backend.remove(id).await?;
        if removed {
            tracing::info!(record_id = %id, "PDF deleted");
            self.publish(StoreEvent::Deleted { id: id.to_string() });
        }
        Ok(removed)
    }

    /// Metadata of records whose name contains `query`, ignoring case.
    ///
    /// A missing or empty query matches everything. File bytes are not read.
    pub async fn search_by_name(&self, query: Option<&str>) -> Result<Vec<RecordSummary>, StorageError> {
        let summaries = self.backend.fetch_summaries().await?;
        let needle = match query {
            None | Some("") => return Ok(summaries),
            Some(q) => q.to_lowercase(),
        };

        Ok(summaries
            .into_iter()
            .filter(|summary| summary.name.to_lowercase().contains(&needle))
            .collect())
    }

    /// Remove every record
    pub async fn clear(&self) -> Result<u64, StorageError> {
        let removed = self.backend.clear().await?;
        if removed > 0 {
            tracing::info!(removed, "Record store cleared");
            self.publish(StoreEvent::Cleared { removed });
        }
        Ok(removed)
    }

    pub async fn usage(&self) -> Result<StoreUsage, StorageError> {
        Ok(StoreUsage {
            records: self.backend.count().await?,
            total_bytes: self.backend.total_bytes().await?,
            quota_bytes: self.quota_bytes,
        })
    }

    /// Receive an event after every successful mutation
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Number of mutations applied so far.
    ///
    /// Read it before a listing; a listing tagged with an older revision than
    /// one already displayed is stale.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    fn publish(&self, event: StoreEvent) {
        self.revision.fetch_add(1, Ordering::SeqCst);
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    async fn render_thumbnail(&self, name: &str, size: u64) -> String {
        let generator = self.thumbnails;
        let file_name = name.to_string();

        match tokio::task::spawn_blocking(move || generator.generate(&file_name, size)).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(file_name = %name, "Thumbnail task failed: {}", e);
                generator.fallback()
            }
        }
    }
}

/// Current time at the precision timestamps are persisted with
fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
