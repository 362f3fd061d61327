//! PDF library endpoints
//!
//! Endpoints:
//! - GET /api/v1/pdfs - List or search stored PDFs
//! - POST /api/v1/pdfs - Upload a PDF (multipart field `file`)
//! - DELETE /api/v1/pdfs - Remove every stored PDF
//! - GET /api/v1/pdfs/usage - Record count and stored bytes
//! - GET /api/v1/pdfs/:id - Record metadata (marks the record as accessed)
//! - GET /api/v1/pdfs/:id/content - PDF bytes for an embedded viewer
//! - GET /api/v1/pdfs/:id/download - PDF bytes as an attachment
//! - DELETE /api/v1/pdfs/:id - Delete a stored PDF

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::format::format_file_size;
use crate::state::AppState;
use crate::store::{sort_records, PdfRecord, RecordSummary, SortKey, SortOrder};
use crate::upload::{self, MULTIPART_OVERHEAD};

// ============================================================================
// Types
// ============================================================================

/// Query parameters for listing
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive name filter
    pub q: Option<String>,
    pub sort: Option<SortKey>,
    pub order: Option<SortOrder>,
}

/// Response for PDF list
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfListResponse {
    pub pdfs: Vec<RecordSummary>,
    pub total: usize,
    /// Echo of the filter this listing answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Store revision the listing was read at
    pub revision: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub removed: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub records: u64,
    pub total_bytes: u64,
    pub total_label: String,
    pub quota_bytes: u64,
}

// ============================================================================
// Router
// ============================================================================

/// Create the PDF router
pub fn router(max_file_size: u64) -> Router<AppState> {
    Router::new()
        .route("/", get(list_pdfs).post(upload_pdf).delete(clear_pdfs))
        .route("/usage", get(usage))
        .route("/:id", get(get_pdf).delete(delete_pdf))
        .route("/:id/content", get(pdf_content))
        .route("/:id/download", get(download_pdf))
        .layer(DefaultBodyLimit::max(
            (max_file_size + MULTIPART_OVERHEAD) as usize,
        ))
}

// ============================================================================
// Handlers
// ============================================================================

/// List stored PDFs, optionally filtered by name and sorted
async fn list_pdfs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PdfListResponse>> {
    let store = state.store();
    let revision = store.revision();

    let mut pdfs = store.search_by_name(query.q.as_deref()).await?;
    if query.sort.is_some() || query.order.is_some() {
        sort_records(
            &mut pdfs,
            query.sort.unwrap_or_default(),
            query.order.unwrap_or_default(),
        );
    }

    Ok(Json(PdfListResponse {
        total: pdfs.len(),
        pdfs,
        query: query.q,
        revision,
    }))
}

/// Upload a PDF
async fn upload_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<RecordSummary>)> {
    let max_file_size = state.config().upload.max_file_size;

    let file = upload::read_upload(multipart, max_file_size).await?;
    file.validate(max_file_size)?;

    let size = file.size();
    let record = state.store().insert(file.data, &file.file_name, size).await?;

    Ok((StatusCode::CREATED, Json(RecordSummary::from(&record))))
}

/// Remove every stored PDF
async fn clear_pdfs(State(state): State<AppState>) -> Result<Json<ClearResponse>> {
    let removed = state.store().clear().await?;
    Ok(Json(ClearResponse { removed }))
}

/// Space used by the store
async fn usage(State(state): State<AppState>) -> Result<Json<UsageResponse>> {
    let usage = state.store().usage().await?;
    Ok(Json(UsageResponse {
        records: usage.records,
        total_bytes: usage.total_bytes,
        total_label: format_file_size(usage.total_bytes),
        quota_bytes: usage.quota_bytes,
    }))
}

/// Get PDF metadata
async fn get_pdf(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<RecordSummary>> {
    let record = find_record(&state, &id).await?;
    Ok(Json(RecordSummary::from(&record)))
}

/// Serve PDF bytes for inline viewing
async fn pdf_content(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let record = find_record(&state, &id).await?;
    pdf_response(record, "inline")
}

/// Serve PDF bytes as a download
async fn download_pdf(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let record = find_record(&state, &id).await?;
    pdf_response(record, "attachment")
}

/// Delete a PDF. Unknown IDs are not an error.
async fn delete_pdf(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    state.store().delete_by_id(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Helpers
// ============================================================================

async fn find_record(state: &AppState, id: &str) -> Result<PdfRecord> {
    state
        .store()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("PDF not found: {}", id)))
}

fn pdf_response(record: PdfRecord, disposition: &str) -> Result<Response> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_LENGTH, record.data.len())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(disposition, &record.name),
        )
        .header(header::CACHE_CONTROL, "private, no-cache")
        .body(Body::from(record.data))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// `Content-Disposition` with an ASCII fallback and an RFC 5987 UTF-8 name
fn content_disposition(disposition: &str, file_name: &str) -> String {
    let ascii: String = file_name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "{}; filename=\"{}\"; filename*=UTF-8''{}",
        disposition,
        ascii,
        urlencoding::encode(file_name)
    )
}
