//! Record store types

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format::{format_date, format_file_size};

// ============================================================================
// Records
// ============================================================================

/// A stored PDF file and its metadata
#[derive(Debug, Clone)]
pub struct PdfRecord {
    /// Unique record ID (UUID v4)
    pub id: String,

    /// Original file name
    pub name: String,

    /// File size in bytes
    pub size: u64,

    /// When the record was stored
    pub created: DateTime<Utc>,

    /// Last successful lookup by ID
    pub last_accessed: Option<DateTime<Utc>>,

    /// Full file content, shared rather than copied between readers
    pub data: Bytes,

    /// PNG data URL preview
    pub thumbnail: Option<String>,
}

/// Record metadata as shown in listings (everything except the file bytes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub size_label: String,
    pub created: DateTime<Utc>,
    pub created_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_accessed_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl RecordSummary {
    /// Build a summary from stored metadata, deriving the display labels
    pub fn new(
        id: String,
        name: String,
        size: u64,
        created: DateTime<Utc>,
        last_accessed: Option<DateTime<Utc>>,
        thumbnail: Option<String>,
    ) -> Self {
        Self {
            size_label: format_file_size(size),
            created_label: format_date(created),
            last_accessed_label: last_accessed.map(format_date),
            id,
            name,
            size,
            created,
            last_accessed,
            thumbnail,
        }
    }
}

impl From<&PdfRecord> for RecordSummary {
    fn from(record: &PdfRecord) -> Self {
        Self::new(
            record.id.clone(),
            record.name.clone(),
            record.size,
            record.created,
            record.last_accessed,
            record.thumbnail.clone(),
        )
    }
}

// ============================================================================
// Listing
// ============================================================================

/// Field to order listings by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Name,
    Size,
    #[default]
    Created,
    LastAccessed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Sort a listing in place. Ties keep their insertion order.
pub fn sort_records(records: &mut [RecordSummary], key: SortKey, order: SortOrder) {
    records.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::Size => a.size.cmp(&b.size),
            SortKey::Created => a.created.cmp(&b.created),
            SortKey::LastAccessed => a.last_accessed.cmp(&b.last_accessed),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

// ============================================================================
// Store state
// ============================================================================

/// Change published after each successful store mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Inserted { id: String, name: String },
    Deleted { id: String },
    Cleared { removed: u64 },
}

/// Space used by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreUsage {
    pub records: u64,
    pub total_bytes: u64,
    /// 0 = unlimited
    pub quota_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(name: &str, size: u64, day: u32) -> PdfRecord {
        let created = Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap();
        PdfRecord {
            id: format!("id-{}", name),
            name: name.to_string(),
            size,
            created,
            last_accessed: None,
            data: Bytes::new(),
            thumbnail: None,
        }
    }

    fn names(records: &[RecordSummary]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_summary_labels() {
        let mut rec = record("Report.pdf", 2048, 5);
        rec.last_accessed = Some(Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap());

        let summary = RecordSummary::from(&rec);
        assert_eq!(summary.size_label, "2.0 KB");
        assert_eq!(summary.created_label, "1/5/2024");
        assert_eq!(summary.last_accessed_label.as_deref(), Some("2/1/2024"));
    }

    #[test]
    fn test_summary_json_omits_data_and_uses_camel_case() {
        let json = serde_json::to_value(RecordSummary::from(&record("a.pdf", 1, 1))).unwrap();
        assert!(json.get("sizeLabel").is_some());
        assert!(json.get("createdLabel").is_some());
        assert!(json.get("data").is_none());
        assert!(json.get("lastAccessed").is_none());
    }

    #[test]
    fn test_sort_records() {
        let mut records: Vec<RecordSummary> = [
            record("beta.pdf", 300, 2),
            record("Alpha.pdf", 100, 3),
            record("gamma.pdf", 200, 1),
        ]
        .iter()
        .map(RecordSummary::from)
        .collect();

        sort_records(&mut records, SortKey::Name, SortOrder::Asc);
        assert_eq!(names(&records), ["Alpha.pdf", "beta.pdf", "gamma.pdf"]);

        sort_records(&mut records, SortKey::Size, SortOrder::Desc);
        assert_eq!(names(&records), ["beta.pdf", "gamma.pdf", "Alpha.pdf"]);

        sort_records(&mut records, SortKey::Created, SortOrder::Asc);
        assert_eq!(names(&records), ["gamma.pdf", "beta.pdf", "Alpha.pdf"]);
    }

    #[test]
    fn test_sort_key_deserializes_camel_case() {
        let key: SortKey = serde_json::from_str("\"lastAccessed\"").unwrap();
        assert_eq!(key, SortKey::LastAccessed);
        let order: SortOrder = serde_json::from_str("\"desc\"").unwrap();
        assert_eq!(order, SortOrder::Desc);
    }
}
