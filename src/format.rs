//! Display formatting shared by every place that shows file metadata

use chrono::{DateTime, Utc};

const KB: u64 = 1024;
const MB: u64 = 1024 * 1024;

/// Format a byte count as `"<n> bytes"`, `"<x.x> KB"` or `"<x.x> MB"`.
///
/// Halves round up, so 1280 bytes is `"1.3 KB"`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes < KB {
        return format!("{} bytes", bytes);
    }
    let (unit, label) = if bytes < MB { (KB, "KB") } else { (MB, "MB") };
    let tenths = (bytes as u128 * 10 + unit as u128 / 2) / unit as u128;
    format!("{}.{} {}", tenths / 10, tenths % 10, label)
}

/// Format a timestamp as a short calendar date (`M/D/YYYY`)
pub fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%-m/%-d/%Y").to_string()
}
