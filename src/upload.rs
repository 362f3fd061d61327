//! Upload boundary
//!
//! Turns a multipart request into a validated [`PdfUpload`] before anything
//! reaches the record store. Rejected uploads never change stored state.

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use bytes::Bytes;

use crate::error::{AppError, Result};

/// Multipart field carrying the file
pub const FILE_FIELD: &str = "file";

/// Room for multipart boundaries and part headers on top of the file itself
pub const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// A file received from a client
#[derive(Debug, Clone)]
pub struct PdfUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl PdfUpload {
    /// Check the declared type, name and size of the upload
    pub fn validate(&self, max_file_size: u64) -> Result<()> {
        if !is_pdf_content_type(&self.content_type) {
            return Err(AppError::InvalidFileType(self.content_type.clone()));
        }

        if self.file_name.trim().is_empty() {
            return Err(AppError::BadRequest("File name is empty".to_string()));
        }

        if self.data.is_empty() {
            return Err(AppError::BadRequest("File is empty".to_string()));
        }

        if self.data.len() as u64 > max_file_size {
            return Err(AppError::FileTooLarge { max: max_file_size });
        }

        Ok(())
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Whether a declared content type names PDF (`application/pdf`,
/// `application/x-pdf`, ...)
pub fn is_pdf_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("pdf")
}

/// Read the `file` field of a multipart upload.
///
/// Parts without a declared content type are typed from their extension.
pub async fn read_upload(mut multipart: Multipart, max_file_size: u64) -> Result<PdfUpload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_file_size))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| guess_content_type(&file_name).to_string());

        // Reject before buffering the body
        if !is_pdf_content_type(&content_type) {
            return Err(AppError::InvalidFileType(content_type));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e, max_file_size))?;

        return Ok(PdfUpload {
            file_name,
            content_type,
            data,
        });
    }

    Err(AppError::BadRequest(format!(
        "Missing multipart field '{}'",
        FILE_FIELD
    )))
}

fn multipart_error(err: MultipartError, max_file_size: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge { max: max_file_size }
    } else {
        AppError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}

/// Guess content type from file extension
fn guess_content_type(file_name: &str) -> &'static str {
    let ext = file_name.rsplit('.').next().unwrap_or("");
    match ext.to_lowercase().as_str() {
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
