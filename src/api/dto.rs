//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::items::Item;
use crate::valuation::InvalidWeight;

// ============================================
// VALUATION DTOs
// ============================================

/// Response of `POST /check-weights`
#[derive(Debug, Serialize)]
pub struct CheckWeightsResponse {
    pub invalid_weights: Vec<InvalidWeight>,
}

/// Request of `POST /calculate-fixed`: rows as JSON objects
#[derive(Debug, Deserialize)]
pub struct CalculateFixedRequest {
    #[serde(default)]
    pub item_data: Vec<Value>,
    #[serde(default)]
    pub price_data: Vec<Value>,
}

/// Response of `POST /upload`
#[derive(Debug, Serialize)]
pub struct QuickValuesResponse {
    pub results: Vec<Value>,
}

// ============================================
// ITEM DTOs
// ============================================

/// Response of `POST /upload-items`
#[derive(Debug, Serialize)]
pub struct UploadItemsResponse {
    pub imported: usize,
    pub ids: Vec<u64>,
}

/// Response of `GET /items`
#[derive(Debug, Serialize)]
pub struct ItemListResponse {
    pub items: Vec<Item>,
    pub total: usize,
}

// ============================================
// CSV EDITOR DTOs
// ============================================

/// Request of `POST /edit-csv`
#[derive(Debug, Deserialize)]
pub struct EditCsvRequest {
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Response of `GET /ping`
#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub message: String,
}

/// Full health status
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub items: usize,
    pub serves_client: bool,
    pub uptime_seconds: u64,
    pub version: String,
}
