//! Validation and storage of receipt files uploaded with an expense.

use std::path::Path;

use axum::{
    body::Bytes,
    extract::multipart::{Field, MultipartError},
    http::StatusCode,
};

use time::OffsetDateTime;

use crate::{Error, endpoints};

/// The largest receipt that may be uploaded, 10 MiB.
pub const MAX_RECEIPT_BYTES: usize = 10 * 1024 * 1024;

/// The MIME types receipts may have.
pub const ALLOWED_RECEIPT_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "application/pdf"];

/// A receipt file read from a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptUpload {
    /// The file name given by the client.
    pub file_name: String,
    /// The MIME type given by the client.
    pub content_type: String,
    /// The contents of the file.
    pub bytes: Bytes,
}

impl ReceiptUpload {
    /// Check the type and size of the receipt.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidReceiptType] if the receipt is not a JPEG, PNG, GIF or PDF file,
    /// or [Error::ReceiptTooLarge] if it is larger than [MAX_RECEIPT_BYTES].
    pub fn validate(&self) -> Result<(), Error> {
        if !ALLOWED_RECEIPT_TYPES.contains(&self.content_type.as_str()) {
            return Err(Error::InvalidReceiptType(self.content_type.clone()));
        }

        if self.bytes.len() > MAX_RECEIPT_BYTES {
            return Err(Error::ReceiptTooLarge);
        }

        Ok(())
    }
}

/// Read a receipt from a multipart form field.
///
/// Returns `None` if the field holds no file, e.g. the client sent an empty file input.
pub async fn read_receipt_field(field: Field<'_>) -> Result<Option<ReceiptUpload>, Error> {
    let file_name = match field.file_name() {
        Some(file_name) if !file_name.is_empty() => file_name.to_owned(),
        _ => return Ok(None),
    };
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_owned();

    // Reject the type before reading a potentially large body.
    if !ALLOWED_RECEIPT_TYPES.contains(&content_type.as_str()) {
        return Err(Error::InvalidReceiptType(content_type));
    }

    let bytes = field.bytes().await.map_err(map_multipart_error)?;

    let receipt = ReceiptUpload {
        file_name,
        content_type,
        bytes,
    };
    receipt.validate()?;

    Ok(Some(receipt))
}

/// Convert an error from reading a multipart form into an [Error].
pub fn map_multipart_error(error: MultipartError) -> Error {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::ReceiptTooLarge
    } else {
        tracing::debug!("Could not read multipart form: {error}");
        Error::MultipartError(error.body_text())
    }
}

/// Replace characters that are unsafe in file names with underscores.
///
/// Only ASCII letters, digits, dots, dashes and underscores are kept. Leading dots are
/// removed so the file cannot be hidden or escape the upload directory.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base_name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);

    let sanitized: String = base_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let sanitized = sanitized.trim_start_matches('.');

    if sanitized.is_empty() {
        "receipt".to_owned()
    } else {
        sanitized.to_owned()
    }
}

/// Write `receipt` to `upload_dir` and return the URL it is served from.
///
/// The file is named `{unix millis}-{sanitized file name}`. The directory is created if needed.
///
/// # Errors
///
/// Returns [Error::ReceiptSaveError] if the file could not be written.
pub async fn save_receipt(upload_dir: &Path, receipt: &ReceiptUpload) -> Result<String, Error> {
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|error| Error::ReceiptSaveError(error.to_string()))?;

    let timestamp_millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let stored_name = format!(
        "{timestamp_millis}-{}",
        sanitize_file_name(&receipt.file_name)
    );

    tokio::fs::write(upload_dir.join(&stored_name), &receipt.bytes)
        .await
        .map_err(|error| Error::ReceiptSaveError(error.to_string()))?;

    tracing::debug!("Saved receipt {stored_name} ({} bytes)", receipt.bytes.len());

    Ok(format!("{}/{stored_name}", endpoints::UPLOADS))
}

/// Delete a receipt previously saved by [save_receipt], logging any failure.
pub async fn remove_receipt(upload_dir: &Path, receipt_url: &str) {
    let Some(stored_name) = receipt_url.rsplit('/').next() else {
        return;
    };

    if let Err(error) = tokio::fs::remove_file(upload_dir.join(stored_name)).await {
        tracing::warn!("Could not remove receipt {stored_name}: {error}");
    }
}
