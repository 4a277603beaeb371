//! HTTP API Client
//!
//! Functions for communicating with the Assayer REST API. Every path
//! called here is one the development shell forwards to the backend.

use gloo_net::http::{Request, Response};
use serde_json::{Map, Value};

/// Local storage key overriding the API origin
const API_BASE_KEY: &str = "assayer_api_url";

/// Get the API base URL from local storage; same origin by default
pub fn get_api_base() -> String {
    let url = web_sys::window()
        .and_then(|window| window.local_storage().ok().flatten())
        .and_then(|storage| storage.get_item(API_BASE_KEY).ok().flatten())
        .unwrap_or_default();
    // Normalize: remove trailing slash
    url.trim_end_matches('/').to_string()
}

/// Set the API base URL in local storage; empty restores same origin
pub fn set_api_base(url: &str) {
    if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
        let _ = if url.trim().is_empty() {
            storage.remove_item(API_BASE_KEY)
        } else {
            storage.set_item(API_BASE_KEY, url.trim())
        };
    }
}

fn url(path: &str) -> String {
    format!("{}{}", get_api_base(), path)
}

// ============ Response Types ============

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct InvalidWeight {
    pub index: usize,
    pub weight: String,
    #[serde(default)]
    pub box_id: String,
    #[serde(default)]
    pub box_no: String,
    #[serde(default)]
    pub row_data: Map<String, Value>,
}

#[derive(Debug, serde::Deserialize)]
struct CheckWeightsResponse {
    invalid_weights: Vec<InvalidWeight>,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct Item {
    pub id: u64,
    pub fields: Map<String, Value>,
    pub uploaded_at: String,
}

#[derive(Debug, serde::Deserialize)]
pub struct ItemListResponse {
    pub items: Vec<Item>,
    pub total: usize,
}

#[derive(Debug, serde::Deserialize)]
pub struct UploadItemsResponse {
    pub imported: usize,
    pub ids: Vec<u64>,
}

#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, serde::Deserialize)]
struct ApiError {
    error: ErrorBody,
}

/// Message of an API error body, or the status line if it has none
pub fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ApiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| format!("Request failed ({})", status))
}

async fn check(response: Response) -> Result<Response, String> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(error_message(status, &body))
}

fn form_with(files: &[(&str, &web_sys::File)]) -> Result<web_sys::FormData, String> {
    let form = web_sys::FormData::new().map_err(|_| "Failed to build form".to_string())?;
    for (name, file) in files {
        form.append_with_blob_and_filename(name, file, &file.name())
            .map_err(|_| format!("Failed to attach {}", name))?;
    }
    Ok(form)
}

async fn post_form(path: &str, files: &[(&str, &web_sys::File)]) -> Result<Response, String> {
    let form = form_with(files)?;
    let response = Request::post(&url(path))
        .body(form)
        .map_err(|e| format!("Request build error: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;
    check(response).await
}

async fn post_json<T: serde::Serialize>(path: &str, body: &T) -> Result<Response, String> {
    let response = Request::post(&url(path))
        .json(body)
        .map_err(|e| format!("Request build error: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;
    check(response).await
}

async fn get(path: &str) -> Result<Response, String> {
    let response = Request::get(&url(path))
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;
    check(response).await
}

async fn bytes(response: Response) -> Result<Vec<u8>, String> {
    response
        .binary()
        .await
        .map_err(|e| format!("Download error: {}", e))
}

// ============ API Functions ============

/// Rows whose weight the backend cannot read
pub async fn check_weights(item_file: &web_sys::File) -> Result<Vec<InvalidWeight>, String> {
    let response = post_form("/check-weights", &[("item_file", item_file)]).await?;
    let result: CheckWeightsResponse = response
        .json()
        .await
        .map_err(|e| format!("Parse error: {}", e))?;
    Ok(result.invalid_weights)
}

/// Valued item rows as CSV bytes. Rows carry any weight corrections.
pub async fn calculate_fixed(item_data: Vec<Value>, price_data: Vec<Value>) -> Result<Vec<u8>, String> {
    #[derive(serde::Serialize)]
    struct CalculateFixedRequest {
        item_data: Vec<Value>,
        price_data: Vec<Value>,
    }

    let response = post_json(
        "/calculate-fixed",
        &CalculateFixedRequest {
            item_data,
            price_data,
        },
    )
    .await?;
    bytes(response).await
}

/// Import an item sheet
pub async fn upload_items(item_file: &web_sys::File) -> Result<UploadItemsResponse, String> {
    let response = post_form("/upload-items", &[("item_file", item_file)]).await?;
    response
        .json()
        .await
        .map_err(|e| format!("Parse error: {}", e))
}

/// Fetch all items
pub async fn fetch_items() -> Result<Vec<Item>, String> {
    let result: ItemListResponse = get("/items")
        .await?
        .json()
        .await
        .map_err(|e| format!("Parse error: {}", e))?;
    Ok(result.items)
}

/// Fetch one item
pub async fn fetch_item(id: u64) -> Result<Item, String> {
    get(&format!("/items/{}", id))
        .await?
        .json()
        .await
        .map_err(|e| format!("Parse error: {}", e))
}

/// Edited grid as CSV bytes
pub async fn edit_csv(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Vec<u8>, String> {
    #[derive(serde::Serialize)]
    struct EditCsvRequest {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    }

    let response = post_json("/edit-csv", &EditCsvRequest { columns, rows }).await?;
    bytes(response).await
}

/// Check the backend is reachable; returns the number of stored items.
/// Uses `/items` since the dev proxy forwards it like every other call.
pub async fn check_connection() -> Result<usize, String> {
    let result: ItemListResponse = get("/items")
        .await?
        .json()
        .await
        .map_err(|e| format!("Parse error: {}", e))?;
    Ok(result.total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_body() {
        let body = r#"{"error":{"code":"VALIDATION_ERROR","message":"Validation error: item_file is required"},"request_id":"x"}"#;
        assert_eq!(
            error_message(400, body),
            "Validation error: item_file is required"
        );
    }

    #[test]
    fn test_error_message_fallback() {
        assert_eq!(error_message(502, "<html>"), "Request failed (502)");
    }
}
