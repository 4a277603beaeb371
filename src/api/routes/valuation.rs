//! Valuation Routes
//!
//! - POST /check-weights - Report unreadable weights in an item sheet
//! - POST /calculate - Value an item sheet against a price sheet
//! - POST /calculate-fixed - Value operator-corrected rows
//! - POST /upload - Quick weight × price values

use axum::{extract::Multipart, response::Response, Json};

use super::{csv_attachment, UploadedFiles};
use crate::api::dto::{
    CalculateFixedRequest, CheckWeightsResponse, QuickValuesResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::table::Table;
use crate::valuation;

/// Download name of every calculation result
pub const RESULT_FILENAME: &str = "calculated_result.csv";

/// POST /check-weights
///
/// Multipart field `item_file`.
pub async fn check_weights(multipart: Multipart) -> ApiResult<Json<CheckWeightsResponse>> {
    let files = UploadedFiles::read(multipart).await?;
    let items = files.table("item_file")?;

    let invalid_weights = valuation::find_invalid_weights(&items);
    tracing::info!(
        rows = items.len(),
        invalid = invalid_weights.len(),
        "Weights checked"
    );

    Ok(Json(CheckWeightsResponse { invalid_weights }))
}

/// POST /calculate
///
/// Multipart fields `item_file` and `price_file`; answers with the item
/// sheet plus valuation columns.
pub async fn calculate(multipart: Multipart) -> ApiResult<Response> {
    let files = UploadedFiles::read(multipart).await?;
    if !files.has("item_file") || !files.has("price_file") {
        return Err(ApiError::Validation("Both files are required".to_string()));
    }

    let mut items = files.table("item_file")?;
    let prices = files.table("price_file")?;
    valuation::calculate(&mut items, &prices)?;

    tracing::info!(rows = items.len(), "Calculation completed");
    csv_attachment(&items, RESULT_FILENAME)
}

/// POST /calculate-fixed
///
/// JSON rows after the operator corrected invalid weights.
pub async fn calculate_fixed(Json(req): Json<CalculateFixedRequest>) -> ApiResult<Response> {
    let mut items = Table::from_records(&req.item_data)?;
    let prices = Table::from_records(&req.price_data)?;
    valuation::calculate_fixed(&mut items, &prices)?;

    tracing::info!(rows = items.len(), "Fixed calculation completed");
    csv_attachment(&items, RESULT_FILENAME)
}

/// POST /upload
///
/// Multipart fields `item_file` and `price_file`.
pub async fn quick_values(multipart: Multipart) -> ApiResult<Json<QuickValuesResponse>> {
    let files = UploadedFiles::read(multipart).await?;
    let items = files.table("item_file")?;
    let prices = files.table("price_file")?;

    let results = valuation::quick_values(&items, &prices)?;
    Ok(Json(QuickValuesResponse { results }))
}
