//! Item Routes
//!
//! - POST /upload-items - Import an item sheet
//! - GET /items - List items
//! - GET /items/:id - Get one item

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::UploadedFiles;
use crate::api::dto::{ItemListResponse, UploadItemsResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::items::Item;

/// POST /upload-items
///
/// Multipart field `item_file`; every row becomes an item.
pub async fn upload_items(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadItemsResponse>)> {
    let files = UploadedFiles::read(multipart).await?;
    let table = files.table("item_file")?;

    if table.is_empty() {
        return Err(ApiError::Validation("item_file has no rows".to_string()));
    }

    let ids = state.items.import_table(&table).await;

    Ok((
        StatusCode::CREATED,
        Json(UploadItemsResponse {
            imported: ids.len(),
            ids,
        }),
    ))
}

/// GET /items
pub async fn list_items(State(state): State<Arc<AppState>>) -> Json<ItemListResponse> {
    let items = state.items.list().await;
    Json(ItemListResponse {
        total: items.len(),
        items,
    })
}

/// GET /items/:id
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<Json<Item>> {
    state
        .items
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Item {}", id)))
}
