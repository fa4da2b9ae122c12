//! The item API implementation.

use crate::{
    feature::item::{
        item_repository::{Item, NewItem},
        item_service,
    },
    infra::{
        error::{ApiResult, ErrorBody},
        extract::Json,
        state::{AppState, ItemStore},
    },
};
use axum::{extract::State, routing::get, Router};
use tracing::instrument;

/// The item API endpoints.
pub fn routes() -> Router<AppState> {
    Router::new().route("/item", get(list_items).post(create_item))
}

/// Lists all items.
#[utoipa::path(
    get,
    path = "/item",
    responses(
        (status = 200, description = "Success", body = [Item]),
        (status = 500, description = "Internal error", body = ErrorBody),
    )
)]
#[instrument(skip_all)]
pub async fn list_items(State(items): State<ItemStore>) -> ApiResult<Json<Vec<Item>>> {
    let items = item_service::list_items(items.as_ref()).await?;
    Ok(Json(items))
}

/// Creates a new item.
#[utoipa::path(
    post,
    path = "/item",
    request_body = NewItem,
    responses(
        (status = 200, description = "Ok", body = Item),
        (status = 400, description = "Invalid item", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody),
    )
)]
#[instrument(skip_all)]
pub async fn create_item(
    State(items): State<ItemStore>,
    Json(new_item): Json<NewItem>,
) -> ApiResult<Json<Item>> {
    let item = item_service::save_item(items.as_ref(), new_item).await?;
    Ok(Json(item))
}
