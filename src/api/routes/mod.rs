//! API Routes
//!
//! Route handlers organized by functionality, plus the upload and CSV
//! download helpers they share.

pub mod editor;
pub mod health;
pub mod items;
pub mod valuation;

use std::collections::HashMap;

use axum::{
    extract::Multipart,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::api::error::{ApiError, ApiResult};
use crate::table::Table;

/// Files of a multipart form, keyed by field name
pub struct UploadedFiles {
    files: HashMap<String, Vec<u8>>,
}

impl UploadedFiles {
    /// Drain a multipart body into memory
    pub async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut files = HashMap::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("Failed to read {}: {}", name, e)))?;
            files.insert(name, bytes.to_vec());
        }

        Ok(Self { files })
    }

    pub fn has(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Parse an uploaded CSV sheet
    pub fn table(&self, name: &str) -> ApiResult<Table> {
        let bytes = self
            .files
            .get(name)
            .ok_or_else(|| ApiError::Validation(format!("{} is required", name)))?;
        Ok(Table::from_csv_bytes(bytes)?)
    }
}

/// A BOM-prefixed CSV download
pub fn csv_attachment(table: &Table, filename: &str) -> ApiResult<Response> {
    let body = table.to_csv_bytes(true)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}
