//! CSV Editor Route
//!
//! - POST /edit-csv - Turn an edited grid back into a CSV download

use axum::{response::Response, Json};

use super::csv_attachment;
use crate::api::dto::EditCsvRequest;
use crate::api::error::ApiResult;
use crate::table::{value_to_cell, Table};

/// POST /edit-csv
pub async fn edit_csv(Json(req): Json<EditCsvRequest>) -> ApiResult<Response> {
    let rows = req
        .rows
        .iter()
        .map(|row| row.iter().map(value_to_cell).collect())
        .collect();
    let table = Table::from_rows(req.columns, rows)?;

    tracing::info!(
        rows = table.len(),
        columns = table.columns().len(),
        "CSV edited"
    );
    csv_attachment(&table, "edited.csv")
}
